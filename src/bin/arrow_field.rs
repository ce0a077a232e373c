//! Arrow field: a grid of arrows following fractal noise, as SVG and G-code.
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use plotty_sketches::config::{load_params, to_ron};
use plotty_sketches::gcode::{self, PostMachine, PostProcessor};
use plotty_sketches::geo_types::svg::{Arrangement, ToSvg};
use plotty_sketches::logging::init_logging;
use plotty_sketches::output;
use plotty_sketches::render::{self, CssColor};
use plotty_sketches::sketches::arrow_field::{ArrowField, ArrowFieldParams, NoiseKind};

#[derive(Parser, Debug)]
#[command(name = "arrow_field")]
#[command(about = "Draw a noise driven arrow field to SVG and G-code")]
struct Args {
    /// RON parameter file. Missing fields keep their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Print the effective parameters as RON and exit
    #[arg(long)]
    dump_params: bool,

    /// Noise seed, overrides the parameter file
    #[arg(long)]
    seed: Option<u32>,

    /// Noise type, overrides the parameter file
    #[arg(long, value_enum)]
    noise: Option<NoiseKind>,

    /// Output directory
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip the G-code file
    #[arg(long)]
    no_gcode: bool,

    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut params: ArrowFieldParams = load_params(args.params.as_deref())?;
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(noise) = args.noise {
        params.noise = noise;
    }
    if args.dump_params {
        println!("{}", to_ron(&params)?);
        return Ok(());
    }

    let (svg_path, gcode_path) = output::sketch_names(&args.output_dir, &params.file_stem());
    output::check_output(&svg_path)?;

    let field = ArrowField::new(params)?;
    let params = field.params();
    info!(
        "{} arrows, {}x{} grid",
        field.arrows().len(),
        params.columns(),
        params.rows()
    );
    let lines = field.to_lines();

    let page = params.page();
    let black = CssColor::from_rgba8(0, 0, 0, 255);
    let doc = render::lines_to_svg(&lines, &Arrangement::unit(&page), &black, params.stroke_width)?;
    render::save_svg(&svg_path, &doc)?;

    if !args.no_gcode {
        let post = PostProcessor::new(PostMachine::ServoPen(params.pen.clone()))?;
        let program = post.post(&lines.arrange(&Arrangement::FlipY(page)))?;
        gcode::save(&gcode_path, &program)?;
    }
    Ok(())
}
