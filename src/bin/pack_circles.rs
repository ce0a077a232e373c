//! Pack random circles into the light (or, inverted, dark) part of an image.
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use plotty_sketches::gcode::{self, PenSettings, PostMachine, PostProcessor};
use plotty_sketches::geo_types::svg::{Arrangement, ToSvg};
use plotty_sketches::logging::init_logging;
use plotty_sketches::mask::OccupancyMask;
use plotty_sketches::output;
use plotty_sketches::packing::{CircleCloud, OverlapStrategy, PackingConfig};
use plotty_sketches::render::{self, CircleStyle};

#[derive(Parser, Debug)]
#[command(name = "pack_circles")]
#[command(about = "Pack non-overlapping random circles inside an image mask, write SVG")]
struct Args {
    /// Mask image. Light pixels are allowed unless --invert is given.
    input: PathBuf,

    /// Number of circles to attempt
    #[arg(short = 'n', long, default_value_t = 300)]
    n_points: usize,

    /// Smallest radius, pixels
    #[arg(long, default_value_t = 2.0)]
    r_min: f64,

    /// Largest radius, pixels
    #[arg(long, default_value_t = 15.0)]
    r_max: f64,

    /// Attempts per circle before giving up on it
    #[arg(short = 'm', long, default_value_t = 100)]
    max_attempts: usize,

    /// Extra space between circles, pixels
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Drop covered pixels from the sampling pool every 100 circles
    #[arg(short = 'u', long)]
    update: bool,

    /// Pack into the dark part of the image instead
    #[arg(short = 'i', long)]
    invert: bool,

    /// Debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// SVG output [default: circles_<stem>_ma-<max_attempts>_n-<n>.svg]
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// RNG seed, random when not given
    #[arg(long)]
    seed: Option<u64>,

    /// Overlap search strategy
    #[arg(long, value_enum, default_value_t = OverlapStrategy::BruteForce)]
    index: OverlapStrategy,

    #[arg(long, default_value = "black")]
    background: String,

    #[arg(long, default_value = "white")]
    fill: String,

    #[arg(long, default_value = "rgb(15%,15%,15%)")]
    stroke: String,

    /// Also write G-code for a servo pen plotter
    #[arg(long)]
    gcode: Option<PathBuf>,

    /// Millimetres per mask pixel, for G-code
    #[arg(long, default_value_t = 0.25)]
    mm_per_px: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = PackingConfig {
        count: args.n_points,
        r_min: args.r_min,
        r_max: args.r_max,
        max_attempts: args.max_attempts,
        offset: args.offset,
        update_pool: args.update,
        overlap: args.index,
        ..Default::default()
    };
    config.validate().context("Invalid packing parameters")?;
    let style = CircleStyle::parse(&args.background, &args.fill, &args.stroke)?;

    let output = match &args.output {
        Some(path) => output::with_svg_extension(path),
        None => output::default_circles_name(&args.input, config.max_attempts, config.count),
    };
    let gcode_output = args
        .gcode
        .as_deref()
        .map(|path| output::with_extension(path, "gcode"));

    output::check_input(&args.input)?;
    output::check_output(&output)?;
    if let Some(path) = &gcode_output {
        output::check_output(path)?;
    }
    let mask = OccupancyMask::open(&args.input, args.invert)
        .with_context(|| format!("Cannot use {} as a mask", args.input.display()))?;
    info!(
        "Loaded {} ({}x{}, {} allowed pixels)",
        args.input.display(),
        mask.width(),
        mask.height(),
        mask.allowed_count()
    );

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let start = Instant::now();
    let mut cloud = CircleCloud::new(mask, config.overlap);
    let report = cloud.place(&config, &mut rng)?;
    info!(
        "Placed {} of {} circles in {:.2?}",
        report.placed,
        report.requested,
        start.elapsed()
    );

    let doc = render::cloud_to_svg(&cloud, &style)?;
    render::save_svg(&output, &doc)?;

    if let Some(path) = gcode_output {
        let arrangement = Arrangement::scaled_flip(&render::cloud_page(&cloud), args.mm_per_px);
        let lines = render::cloud_to_lines(&cloud).arrange(&arrangement);
        let post = PostProcessor::new(PostMachine::ServoPen(PenSettings::default()))?;
        let program = post.post(&lines)?;
        gcode::save(&path, &program)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
