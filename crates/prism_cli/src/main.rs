use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use prism_core::{load_scene, PpmEncoding, SceneLimits};
use prism_renderer::{render, RenderConfig, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_DEPTH};

/// Render a scene description to a PPM image.
#[derive(Debug, Parser)]
#[command(name = "prism", version)]
struct Cli {
    /// Output image width in pixels
    width: u32,

    /// Output image height in pixels
    height: u32,

    /// Scene description (.scene)
    input: PathBuf,

    /// Output image (.ppm)
    output: PathBuf,

    /// PPM flavour to write
    #[arg(long, value_enum, default_value_t = Format::Ascii)]
    format: Format,

    /// Deepest reflection bounce that is still traced
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Bucket edge length in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Render on the calling thread only
    #[arg(long)]
    single_threaded: bool,

    /// Maximum number of primitives and lights in the scene
    #[arg(long, default_value_t = SceneLimits::default().max_entities)]
    max_entities: usize,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// P3, plain text samples
    Ascii,
    /// P6, raw bytes
    Binary,
}

impl From<Format> for PpmEncoding {
    fn from(format: Format) -> Self {
        match format {
            Format::Ascii => PpmEncoding::Ascii,
            Format::Binary => PpmEncoding::Binary,
        }
    }
}

impl Cli {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "image size must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        if !has_extension(&self.input, "scene") {
            bail!("input file {} must have a .scene extension", self.input.display());
        }
        if !has_extension(&self.output, "ppm") {
            bail!("output file {} must have a .ppm extension", self.output.display());
        }
        Ok(())
    }

    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            max_depth: self.max_depth,
            bucket_size: self.bucket_size,
            parallel: !self.single_threaded,
            ..RenderConfig::default().with_resolution(self.width, self.height)
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    cli.validate()?;

    let limits = SceneLimits {
        max_entities: cli.max_entities,
    };
    let scene = load_scene(&cli.input, &limits)
        .with_context(|| format!("Failed to load scene {}", cli.input.display()))?;

    let image = render(&scene, &cli.render_config()).context("Render failed")?;

    image
        .save_ppm(&cli.output, cli.format.into())
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    log::info!("Wrote {}", cli.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}
