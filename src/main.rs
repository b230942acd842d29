//! flowviz CLI - optical flow visualization
//!
//! Renders the motion between every pair of consecutive frames of a video
//! into a numbered image.

use clap::Parser;
use flowviz_lib::flow::render::DEFAULT_FLOW_SCALE;
use flowviz_lib::flow::{BlockMatchConfig, BlockMatchEstimator, FlowRenderer, RenderConfig};
use flowviz_lib::format::writer::DEFAULT_JPEG_QUALITY;
use flowviz_lib::format::{FileImageWriter, OutputFormat};
use flowviz_lib::sequencer::{FrameSequencer, SequencerConfig};
use flowviz_lib::util::{ColorWheel, PixelFormat};
use flowviz_lib::{init, Config};
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "flowviz")]
#[command(about = "flowviz - optical flow visualization", long_about = None)]
#[command(version)]
struct Cli {
    /// Input video: a .y4m file or a directory of images
    input: PathBuf,

    /// Directory receiving one image per frame
    output_dir: PathBuf,

    /// Normalization scale in pixels; zero or negative derives it per frame
    #[arg(long, default_value_t = DEFAULT_FLOW_SCALE, allow_negative_numbers = true)]
    scale: f32,

    /// Output pixel layout (rgb, rgba)
    #[arg(long, default_value = "rgba")]
    pixel_format: PixelFormat,

    /// Darkening of out-of-range vectors (default 0.75 for rgba, 0.5 for rgb)
    #[arg(long)]
    darken: Option<f32>,

    /// Output image format (jpg, png, bmp)
    #[arg(short, long, default_value = "jpg")]
    format: OutputFormat,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Write one image per frame transition instead of one per frame
    #[arg(long)]
    no_pad_tail: bool,

    /// Block size of the motion estimator
    #[arg(long, default_value_t = 8)]
    block_size: usize,

    /// Search range of the motion estimator in pixels
    #[arg(long, default_value_t = 8)]
    search_range: usize,

    /// Mean absolute difference above which a block's motion is invalid
    #[arg(long)]
    confidence_threshold: Option<f32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Number of threads to use
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<flowviz_lib::Error>() {
            Some(err) if err.reports_to_stdout() => println!("{}", err),
            _ => eprintln!("Error: {:#}", e),
        }
        process::exit(-1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        max_threads: cli.threads,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init(config)?;

    info!("flowviz v{}", flowviz_lib::VERSION);

    let wheel = ColorWheel::new();

    let mut render_config = match cli.pixel_format {
        PixelFormat::RGBA => RenderConfig::transparent(),
        PixelFormat::RGB24 => RenderConfig::opaque(),
    };
    render_config = render_config.with_scale((cli.scale > 0.0).then_some(cli.scale));
    if let Some(darken) = cli.darken {
        render_config = render_config.with_darken(darken);
    }
    render_config.validate()?;

    let estimator = BlockMatchEstimator::new(
        BlockMatchConfig::new()
            .with_block_size(cli.block_size)
            .with_search_range(cli.search_range)
            .with_confidence_threshold(cli.confidence_threshold),
    )?;
    let writer = FileImageWriter::new(cli.quality)?;

    let sequencer_config = SequencerConfig::new(&cli.output_dir)
        .with_output_format(cli.format)
        .with_pad_tail(!cli.no_pad_tail);

    let mut sequencer = FrameSequencer::new(
        Box::new(estimator),
        FlowRenderer::new(&wheel, render_config),
        Box::new(writer),
        sequencer_config,
    );

    let summary = sequencer.run_path(&cli.input)?;

    let total: f64 = summary.estimate_seconds.iter().sum();
    info!(
        "done: {} frames read, {} images written, {:.3} sec estimating",
        summary.frames_read,
        summary.images_written(),
        total
    );

    Ok(())
}
