//! dzi-pyramid - Deep Zoom pyramids from large images.
//!
//! This binary parses the CLI, opens the source image and runs the requested command.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dzi_pyramid::{
    config::{Cli, Command, InfoConfig, PyramidArgs, TileConfig},
    DeepZoomGenerator, ImageSlide, SlideSource, StaticTiler, TileEncoder,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Tile(config) => run_tile(config).await,
        Command::Info(config) => run_info(config),
    }
}

// =============================================================================
// Tile Command
// =============================================================================

async fn run_tile(config: TileConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let slide = match open_slide(&config.image, &config.pyramid) {
        Ok(slide) => slide,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let generator = match DeepZoomGenerator::new(slide, config.pyramid.deepzoom_config()) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            error!("Failed to build pyramid: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let encoder = match TileEncoder::new(config.format, config.quality) {
        Ok(encoder) => encoder,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (width, height) = generator.dimensions();
    info!("Image: {}", config.image.display());
    info!(
        "  Pyramid: {}x{}, {} levels, {} tiles",
        width,
        height,
        generator.level_count(),
        generator.tile_count()
    );
    info!(
        "  Tiles: {} px + {} px overlap, {} (quality {})",
        config.pyramid.tile_size, config.pyramid.overlap, config.format, config.quality
    );
    info!("  Native levels: {}", generator.source().level_count());

    let tiler = StaticTiler::new(generator, encoder, config.basename()).with_jobs(config.jobs);
    let started = Instant::now();

    match tiler.run().await {
        Ok(report) => {
            info!(
                "Wrote {} tiles ({} already present) to {} in {:.1}s",
                report.written,
                report.skipped,
                tiler.tiles_dir().display(),
                started.elapsed().as_secs_f64()
            );
            info!("Descriptor: {}", tiler.dzi_path().display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Tiling failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let generator = match open_slide(&config.image, &config.pyramid).and_then(|slide| {
        DeepZoomGenerator::new(slide, config.pyramid.deepzoom_config()).map_err(|e| e.to_string())
    }) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.dzi {
        println!("{}", generator.dzi(config.format));
        return ExitCode::SUCCESS;
    }

    match serde_json::to_string_pretty(&generator.summary()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Decode the image and apply native levels, background and bounds options.
fn open_slide(path: &Path, pyramid: &PyramidArgs) -> Result<ImageSlide, String> {
    let mut slide = ImageSlide::open(path)
        .map_err(|e| e.to_string())?
        .with_native_levels(pyramid.native_factor);

    if let Some(background) = pyramid.background_color()? {
        slide = slide.with_background(background);
    }
    if !pyramid.ignore_bounds {
        if let Some(bounds) = slide.detect_bounds() {
            info!(
                "  Content bounds: {}x{} at ({}, {})",
                bounds.width, bounds.height, bounds.x, bounds.y
            );
            slide = slide.with_bounds(bounds);
        }
    }

    Ok(slide)
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dzi_pyramid=debug"
    } else {
        "dzi_pyramid=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
