//! Source capability interface.
//!
//! This module defines the `SlideSource` trait, the only view the Deep Zoom
//! generator has of the underlying image. A source exposes its native pyramid
//! (dimensions and downsample per level), an optional content bounding box,
//! and a region-extraction operation.
//!
//! # Coordinate Frames
//!
//! - Region locations are always given in level 0 pixel coordinates.
//! - Region sizes are given in pixels of the requested native level.

use image::{Rgb, RgbaImage};
use serde::Serialize;

use crate::error::SourceError;

// =============================================================================
// Level Metadata
// =============================================================================

/// Metadata for a single native pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceLevel {
    /// Native level index (0 = full resolution)
    pub index: usize,

    /// Width of this level in pixels
    pub width: u32,

    /// Height of this level in pixels
    pub height: u32,

    /// Downsample factor relative to level 0
    pub downsample: f64,
}

/// Rectangle of non-empty content, in level 0 pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundsBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundsBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Default background behind transparent regions (white).
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

// =============================================================================
// SlideSource Trait
// =============================================================================

/// Capability interface for a multi-resolution image.
///
/// Implementations must be cheap to query for metadata: the generator reads
/// all level metadata once at construction and never again. `read_region` is
/// called once per rendered tile and may block.
pub trait SlideSource: Send + Sync {
    /// Number of native pyramid levels.
    fn level_count(&self) -> usize;

    /// Dimensions of a native level, or `None` if out of range.
    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)>;

    /// Downsample factor of a native level relative to level 0.
    ///
    /// Level 0 always reports 1.0.
    fn level_downsample(&self, level: usize) -> Option<f64>;

    /// Read a region as straight (non-premultiplied) RGBA.
    ///
    /// `location` is the top-left corner in level 0 coordinates, `size` is in
    /// pixels of `level`. Pixels outside the image are fully transparent.
    fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<RgbaImage, SourceError>;

    /// Dimensions of level 0.
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.level_dimensions(0)
    }

    /// Bounding box of the non-empty region, if the source knows one.
    fn bounds(&self) -> Option<BoundsBox> {
        None
    }

    /// Color composited behind transparent pixels.
    fn background_color(&self) -> Rgb<u8> {
        DEFAULT_BACKGROUND
    }

    /// Find the best native level for displaying the given downsample.
    ///
    /// Picks the level with the largest downsample that does not exceed the
    /// requested one, so the region never has to be upsampled. Requests
    /// finer than level 0 get level 0.
    fn best_level_for_downsample(&self, downsample: f64) -> usize {
        let mut best_level = 0;
        let mut best_downsample = self.level_downsample(0).unwrap_or(1.0);

        for level in 1..self.level_count() {
            let Some(level_downsample) = self.level_downsample(level) else {
                continue;
            };
            if level_downsample <= downsample && level_downsample > best_downsample {
                best_level = level;
                best_downsample = level_downsample;
            }
        }

        best_level
    }

    /// Collect metadata for every native level.
    fn source_levels(&self) -> Result<Vec<SourceLevel>, SourceError> {
        let level_count = self.level_count();
        if level_count == 0 {
            return Err(SourceError::Other("source has no levels".to_string()));
        }

        (0..level_count)
            .map(|index| {
                let missing = || SourceError::LevelOutOfRange {
                    level: index,
                    level_count,
                };
                let (width, height) = self.level_dimensions(index).ok_or_else(missing)?;
                let downsample = self.level_downsample(index).ok_or_else(missing)?;
                Ok(SourceLevel {
                    index,
                    width,
                    height,
                    downsample,
                })
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
