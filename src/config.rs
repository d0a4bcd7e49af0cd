//! Command-line configuration for the `dzi-pyramid` binary.
//!
//! This module provides the CLI definitions:
//! - Command-line arguments via clap
//! - Environment variables with `DZI_` prefix
//! - Sensible defaults matching the Deep Zoom conventions (254 px tiles, 1 px overlap)
//!
//! # Environment Variables
//!
//! - `DZI_TILE_SIZE` - Tile edge length (default: 254)
//! - `DZI_OVERLAP` - Overlap of adjacent tiles (default: 1)
//! - `DZI_NATIVE_FACTOR` - Downsample between synthesized native levels (default: 4)
//! - `DZI_BACKGROUND` - Background color as hex RGB (default: ffffff)
//! - `DZI_FORMAT` - Tile format, jpeg or png (default: jpeg)
//! - `DZI_QUALITY` - JPEG quality (default: 90)
//! - `DZI_JOBS` - Concurrent tile workers (default: 4)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use image::Rgb;

use crate::deepzoom::{DeepZoomConfig, TileFormat, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE};
use crate::tile::{is_valid_quality, DEFAULT_JOBS, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default downsample factor between synthesized native levels.
pub const DEFAULT_NATIVE_FACTOR: u32 = 4;

/// Upper bound on concurrent tile workers.
pub const MAX_JOBS: usize = 256;

// =============================================================================
// CLI Arguments
// =============================================================================

/// dzi-pyramid - Deep Zoom pyramids from large images.
#[derive(Parser, Debug, Clone)]
#[command(name = "dzi-pyramid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a Deep Zoom directory tree (.dzi + tiles) for an image.
    Tile(TileConfig),

    /// Print the Deep Zoom pyramid layout of an image.
    Info(InfoConfig),
}

/// Options shared by every command that builds a pyramid.
#[derive(Args, Debug, Clone)]
pub struct PyramidArgs {
    /// Tile edge length in pixels, excluding overlap.
    #[arg(short = 's', long = "size", default_value_t = DEFAULT_TILE_SIZE, env = "DZI_TILE_SIZE")]
    pub tile_size: u32,

    /// Overlap of adjacent tiles in pixels.
    #[arg(short = 'e', long, default_value_t = DEFAULT_OVERLAP, env = "DZI_OVERLAP")]
    pub overlap: u32,

    /// Display the entire image instead of its non-transparent bounding box.
    #[arg(short = 'B', long, default_value_t = false)]
    pub ignore_bounds: bool,

    /// Downsample between synthesized native levels (1 disables them).
    #[arg(long, default_value_t = DEFAULT_NATIVE_FACTOR, env = "DZI_NATIVE_FACTOR")]
    pub native_factor: u32,

    /// Background color for transparent pixels, as hex RGB (e.g. ffffff).
    #[arg(long, env = "DZI_BACKGROUND")]
    pub background: Option<String>,
}

impl PyramidArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("tile size must be greater than 0".to_string());
        }
        if self.native_factor == 0 {
            return Err("native_factor must be at least 1".to_string());
        }
        self.background_color()?;
        Ok(())
    }

    pub fn deepzoom_config(&self) -> DeepZoomConfig {
        DeepZoomConfig::new(self.tile_size, self.overlap, !self.ignore_bounds)
    }

    /// Parsed background color, if one was given.
    pub fn background_color(&self) -> Result<Option<Rgb<u8>>, String> {
        self.background.as_deref().map(parse_hex_color).transpose()
    }
}

/// `tile` command configuration.
#[derive(Args, Debug, Clone)]
pub struct TileConfig {
    /// Source image file.
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Base name of the output (writes NAME.dzi and NAME_files/).
    ///
    /// Defaults to the image file name without extension.
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<PathBuf>,

    /// Image format for tiles (jpeg or png).
    #[arg(short, long, default_value_t = TileFormat::Jpeg, env = "DZI_FORMAT")]
    pub format: TileFormat,

    /// JPEG compression quality (1-100).
    #[arg(short = 'Q', long, default_value_t = DEFAULT_JPEG_QUALITY, env = "DZI_QUALITY")]
    pub quality: u8,

    /// Number of concurrent tile workers.
    #[arg(short, long, default_value_t = DEFAULT_JOBS, env = "DZI_JOBS")]
    pub jobs: usize,

    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl TileConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid.validate()?;

        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        if self.jobs == 0 || self.jobs > MAX_JOBS {
            return Err(format!("jobs must be between 1 and {}", MAX_JOBS));
        }
        if self.output.is_none() && self.image.file_stem().is_none() {
            return Err("cannot derive output name from image path; set --output".to_string());
        }

        Ok(())
    }

    /// Output base name: `--output`, or the image file stem.
    pub fn basename(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => PathBuf::from(self.image.file_stem().unwrap_or_default()),
        }
    }
}

/// `info` command configuration.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Source image file.
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Print the DZI descriptor instead of the JSON summary.
    #[arg(long, default_value_t = false)]
    pub dzi: bool,

    /// Tile format named in the DZI descriptor.
    #[arg(short, long, default_value_t = TileFormat::Jpeg)]
    pub format: TileFormat,

    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid.validate()
    }
}

/// Parse a six-digit hex color, with or without a leading `#`.
pub fn parse_hex_color(value: &str) -> Result<Rgb<u8>, String> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("invalid color '{}': expected RRGGBB", value));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| format!("invalid color '{}': expected RRGGBB", value))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

// =============================================================================
// Tests
// =============================================================================
