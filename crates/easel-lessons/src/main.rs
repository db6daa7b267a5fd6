//! Instructional lessons for the easel engine.
//!
//! ```text
//! easel-lessons --lesson translation
//! easel-lessons --lesson vertex-color --color-encoding unorm8
//! easel-lessons --headless --width 300 --height 150 --density 2
//! ```

mod app;
mod dry_run;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::dpi::LogicalSize;

use easel_engine::device::GpuInit;
use easel_engine::lesson::{ColorEncoding, Lesson, LessonOptions};
use easel_engine::logging::{LoggingConfig, init_logging};
use easel_engine::window::{Runtime, RuntimeConfig};

use crate::app::LessonApp;

#[derive(Debug, Parser)]
#[command(name = "easel-lessons", version, about = "2D rendering lessons on wgpu")]
struct Args {
    /// Lesson to run: flat-color, vertex-color or translation (or 1, 2, 3).
    #[arg(short, long, default_value_t = Lesson::FlatColor)]
    lesson: Lesson,

    /// Storage of per-vertex colors: float or unorm8.
    #[arg(long, default_value = "float")]
    color_encoding: ColorEncoding,

    /// Render once into a recording backend and log the GPU calls instead of
    /// opening a window.
    #[arg(long)]
    headless: bool,

    /// Canvas width in logical pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height in logical pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Pixel density of the headless canvas. Windows report their own.
    #[arg(long, default_value_t = 1.0)]
    density: f64,

    /// Log filter, `env_logger` syntax. Falls back to RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    /// Seed for the random colors.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let options = LessonOptions {
        color_encoding: args.color_encoding,
    };

    if args.headless {
        return dry_run::run(args.lesson, &options, rng, (args.width, args.height, args.density));
    }

    let config = RuntimeConfig {
        title: format!("easel · {}", args.lesson),
        initial_size: LogicalSize::new(args.width, args.height),
    };
    Runtime::run(config, GpuInit::default(), LessonApp::new(args.lesson, options, rng))
}
