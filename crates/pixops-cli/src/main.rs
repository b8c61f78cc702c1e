//! pixops - pixel operations on PNG and JPEG files
//!
//! Grayscale, sharpen, arbitrary convolution, crop and upscale.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use pixops_core::Point;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "pixops")]
#[command(author, version, about = "Pixel operations on PNG and JPEG images")]
#[command(long_about = "
Pixel-level image transforms: grayscale, sharpen, convolve, crop, upscale.

Examples:
  pixops info photo.jpg                         # Show image info
  pixops info photo.jpg --json                  # Machine-readable
  pixops grayscale photo.jpg                    # -> processed_image.png
  pixops sharpen photo.png -o sharp.png
  pixops convolve photo.png -k emboss -o relief.png
  pixops convolve photo.png -w 0,-1,0,-1,4,-1,0,-1,0 --alpha-blend 1 -o edges.png
  pixops crop photo.png --from 120,40 --to 20,200 -o part.png
  pixops upscale photo.png -r 3 -f nearest      # -> upscaled_image.jpg
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert to grayscale (unweighted RGB mean)
    #[command(visible_alias = "gray")]
    Grayscale(GrayscaleArgs),

    /// Apply the sharpen kernel
    Sharpen(SharpenArgs),

    /// Apply a named or custom convolution kernel
    #[command(visible_alias = "conv")]
    Convolve(ConvolveArgs),

    /// Crop the rectangle spanned by two corners
    Crop(CropArgs),

    /// Scale by a ratio
    #[command(visible_alias = "up")]
    Upscale(UpscaleArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

/// Output options shared by every transform.
#[derive(Args)]
struct OutputArgs {
    /// Output image (defaults to processed_image.png / upscaled_image.jpg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "90")]
    quality: u8,
}

#[derive(Args)]
struct GrayscaleArgs {
    /// Input image
    input: PathBuf,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct SharpenArgs {
    /// Input image
    input: PathBuf,

    /// Edge policy: truncate, clamp
    #[arg(short, long, default_value = "truncate")]
    edge: String,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct ConvolveArgs {
    /// Input image
    input: PathBuf,

    /// Named kernel: sharpen, identity, box, edge, emboss
    #[arg(short, long, conflicts_with = "weights")]
    kernel: Option<String>,

    /// Custom square kernel, row-major, comma separated
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    weights: Option<Vec<f32>>,

    /// Alpha blend factor toward opaque, 0-1 (custom kernels default to 0,
    /// named kernels keep their own)
    #[arg(long)]
    alpha_blend: Option<f32>,

    /// Edge policy: truncate, clamp
    #[arg(short, long, default_value = "truncate")]
    edge: String,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct CropArgs {
    /// Input image
    input: PathBuf,

    /// First corner as X,Y
    #[arg(long, value_parser = parse_point)]
    from: Point,

    /// Opposite corner as X,Y
    #[arg(long, value_parser = parse_point)]
    to: Point,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct UpscaleArgs {
    /// Input image
    input: PathBuf,

    /// Scale ratio
    #[arg(short, long, default_value = "2.0")]
    ratio: f64,

    /// Filter: bilinear, nearest
    #[arg(short, long, default_value = "bilinear")]
    filter: String,

    #[command(flatten)]
    out: OutputArgs,
}

/// Parses `X,Y`.
fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse::<u32>().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse::<u32>().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok(Point::new(x, y))
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the level follows `-v`. The returned guard
/// flushes the log file and must live until exit.
fn init_logging(verbose: u8, log_file: Option<&PathBuf>) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Invalid log file: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let verbose = cli.verbose > 0;
    match cli.command {
        Commands::Info(args) => commands::info::run(args, verbose),
        Commands::Grayscale(args) => commands::grayscale::run(args, verbose),
        Commands::Sharpen(args) => commands::sharpen::run(args, verbose),
        Commands::Convolve(args) => commands::convolve::run(args, verbose),
        Commands::Crop(args) => commands::crop::run(args, verbose),
        Commands::Upscale(args) => commands::upscale::run(args, verbose),
    }
}
