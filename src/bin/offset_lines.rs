//! Offset lines: one wavy line and a stack of ever noisier copies.
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use plotty_sketches::config::{load_params, to_ron};
use plotty_sketches::gcode::{self, PostMachine, PostProcessor};
use plotty_sketches::geo_types::svg::Arrangement;
use plotty_sketches::logging::init_logging;
use plotty_sketches::output;
use plotty_sketches::render::{self, CssColor};
use plotty_sketches::sketches::offset_lines::{line_stack, to_lines, x_extent, OffsetLinesParams};

#[derive(Parser, Debug)]
#[command(name = "offset_lines")]
#[command(about = "Draw a stack of noisily offset lines to G-code, with an SVG preview")]
struct Args {
    /// RON parameter file. Missing fields keep their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Print the effective parameters as RON and exit
    #[arg(long)]
    dump_params: bool,

    /// RNG seed, overrides the parameter file
    #[arg(long)]
    seed: Option<u64>,

    /// G-code output
    #[arg(short = 'o', long, default_value = output::OFFSET_LINES_GCODE)]
    output: PathBuf,

    /// SVG preview output
    #[arg(long, default_value = output::OFFSET_LINES_PREVIEW)]
    preview: PathBuf,

    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut params: OffsetLinesParams = load_params(args.params.as_deref())?;
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if args.dump_params {
        println!("{}", to_ron(&params)?);
        return Ok(());
    }

    let gcode_path = output::with_extension(&args.output, "gcode");
    let preview_path = output::with_svg_extension(&args.preview);
    output::check_output(&gcode_path)?;
    output::check_output(&preview_path)?;

    let seed = params.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let lines = line_stack(&params, &mut rng);
    if let Some((left, right)) = x_extent(&lines) {
        info!("{} lines from x={:.1} to x={:.1} mm", lines.len(), left, right);
    }

    // Noisiest line first on the plotter.
    let post = PostProcessor::new(PostMachine::ServoPen(params.pen.clone()))?;
    let program = post.post(&to_lines(&lines, true))?;
    gcode::save(&gcode_path, &program)?;

    let black = CssColor::from_rgba8(0, 0, 0, 255);
    let doc = render::lines_to_svg(
        &to_lines(&lines, false),
        &Arrangement::FlipY(params.page()),
        &black,
        params.stroke_width,
    )?;
    render::save_svg(&preview_path, &doc)?;
    Ok(())
}
