//! Deep Zoom generator over a `SlideSource`.
//!
//! All tables (synthetic levels, native level mapping, active area) are
//! computed once in [`DeepZoomGenerator::new`]. Every tile request afterwards
//! is a pure function of the tile address and those tables, so a generator
//! can be shared across threads behind an `Arc` without locking.

use std::fmt;

use image::{Rgb, RgbImage};
use serde::Serialize;
use tracing::debug;

use crate::error::DeepZoomError;
use crate::slide::{SlideSource, SourceLevel};

use super::compositor::render_tile;
use super::dzi::{generate_dzi_xml, TileFormat};
use super::geometry::{GeometryContext, TileAddress, TileCoordinates, TileGeometry};
use super::levels::{build_levels, SyntheticLevel};
use super::mapping::{map_levels, LevelMapping};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 254;

/// Default overlap added to interior tile edges.
pub const DEFAULT_OVERLAP: u32 = 1;

// =============================================================================
// Configuration
// =============================================================================

/// Construction parameters for a [`DeepZoomGenerator`].
///
/// For best viewer performance `tile_size + 2 * overlap` should be a power
/// of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeepZoomConfig {
    /// Width and height of a tile, excluding overlap
    pub tile_size: u32,

    /// Extra pixels added to each interior edge of a tile
    pub overlap: u32,

    /// Render only the source's non-empty bounding box
    pub limit_bounds: bool,
}

impl Default for DeepZoomConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_OVERLAP,
            limit_bounds: false,
        }
    }
}

impl DeepZoomConfig {
    pub fn new(tile_size: u32, overlap: u32, limit_bounds: bool) -> Self {
        Self {
            tile_size,
            overlap,
            limit_bounds,
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), DeepZoomError> {
        if self.tile_size == 0 {
            return Err(DeepZoomError::Configuration(
                "tile_size must be greater than 0".to_string(),
            ));
        }
        let padded = self
            .overlap
            .checked_mul(2)
            .and_then(|o| o.checked_add(self.tile_size));
        if padded.is_none() {
            return Err(DeepZoomError::Configuration(format!(
                "overlap {} is too large for tile_size {}",
                self.overlap, self.tile_size
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Summary
// =============================================================================

/// One synthetic level and where its pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSummary {
    #[serde(flatten)]
    pub level: SyntheticLevel,
    pub source_level: usize,
    pub residual_scale: f64,
}

/// Serializable description of a generator's pyramid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidSummary {
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub config: DeepZoomConfig,
    pub level_count: usize,
    pub tile_count: u64,
    pub native_levels: Vec<SourceLevel>,
    pub levels: Vec<LevelSummary>,
}

// =============================================================================
// Generator
// =============================================================================

/// Generates Deep Zoom tiles and metadata for a source.
pub struct DeepZoomGenerator<S> {
    source: S,
    config: DeepZoomConfig,

    /// Level 0 offset of the active area
    l0_offset: (u32, u32),

    /// Native levels, dimensions limited to the active area
    native_levels: Vec<SourceLevel>,

    /// Synthetic levels, index 0 = 1x1
    levels: Vec<SyntheticLevel>,

    /// Native level choice per synthetic level
    mappings: Vec<LevelMapping>,

    background: Rgb<u8>,
}

impl<S: SlideSource> DeepZoomGenerator<S> {
    /// Create a generator wrapping `source`.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `tile_size` is zero
    /// - `Source` if the source's level metadata is incomplete
    pub fn new(source: S, config: DeepZoomConfig) -> Result<Self, DeepZoomError> {
        config.validate()?;

        let mut native_levels = source.source_levels()?;
        let (l0_width, l0_height) = (native_levels[0].width, native_levels[0].height);

        let bounds = if config.limit_bounds {
            source.bounds()
        } else {
            None
        };
        let l0_offset = match bounds {
            Some(bounds) => {
                // Scale every native level by the fraction of level 0 in bounds
                let scale = |dim: u32, bound: u32, l0: u32| -> u32 {
                    if l0 == 0 {
                        return dim;
                    }
                    (dim as u64 * bound as u64).div_ceil(l0 as u64) as u32
                };
                for level in &mut native_levels {
                    level.width = scale(level.width, bounds.width, l0_width);
                    level.height = scale(level.height, bounds.height, l0_height);
                }
                (bounds.x, bounds.y)
            }
            None => (0, 0),
        };

        let (width, height) = (native_levels[0].width, native_levels[0].height);
        let levels = build_levels(width, height, config.tile_size);
        let mappings = map_levels(&source, &native_levels, levels.len());

        debug!(
            width,
            height,
            level_count = levels.len(),
            native_levels = native_levels.len(),
            tile_size = config.tile_size,
            overlap = config.overlap,
            limit_bounds = config.limit_bounds,
            "Built Deep Zoom pyramid"
        );

        let background = source.background_color();
        Ok(Self {
            source,
            config,
            l0_offset,
            native_levels,
            levels,
            mappings,
            background,
        })
    }

    /// Create a generator with default parameters (254 px tiles, 1 px overlap).
    pub fn with_defaults(source: S) -> Result<Self, DeepZoomError> {
        Self::new(source, DeepZoomConfig::default())
    }

    /// Number of Deep Zoom levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Total number of tiles across all levels.
    pub fn tile_count(&self) -> u64 {
        self.levels.iter().map(SyntheticLevel::tile_count).sum()
    }

    /// `(tiles_x, tiles_y)` for each level.
    pub fn level_tiles(&self) -> Vec<(u32, u32)> {
        self.levels.iter().map(SyntheticLevel::tiles).collect()
    }

    /// `(width, height)` in pixels for each level.
    pub fn level_dimensions(&self) -> Vec<(u32, u32)> {
        self.levels.iter().map(SyntheticLevel::dimensions).collect()
    }

    /// Full synthetic level table.
    pub fn levels(&self) -> &[SyntheticLevel] {
        &self.levels
    }

    /// Native level choice for each synthetic level.
    pub fn level_mappings(&self) -> &[LevelMapping] {
        &self.mappings
    }

    /// Native levels as seen by the generator (limited to the active area).
    pub fn native_levels(&self) -> &[SourceLevel] {
        &self.native_levels
    }

    /// Dimensions of the full-resolution level.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.native_levels[0].width, self.native_levels[0].height)
    }

    pub fn config(&self) -> &DeepZoomConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Describe the pyramid: levels, tile grids and native level choices.
    pub fn summary(&self) -> PyramidSummary {
        let (width, height) = self.dimensions();
        PyramidSummary {
            width,
            height,
            config: self.config,
            level_count: self.level_count(),
            tile_count: self.tile_count(),
            native_levels: self.native_levels.clone(),
            levels: self
                .levels
                .iter()
                .zip(&self.mappings)
                .map(|(&level, mapping)| LevelSummary {
                    level,
                    source_level: mapping.source_level,
                    residual_scale: mapping.residual_scale,
                })
                .collect(),
        }
    }

    /// XML descriptor for the `.dzi` file.
    ///
    /// `format` is the tile image format, `"jpeg"` or `"png"`.
    pub fn get_dzi(&self, format: &str) -> Result<String, DeepZoomError> {
        let format: TileFormat = format.parse()?;
        Ok(self.dzi(format))
    }

    /// XML descriptor for an already-parsed tile format.
    pub fn dzi(&self, format: TileFormat) -> String {
        let (width, height) = self.dimensions();
        generate_dzi_xml(
            width,
            height,
            self.config.tile_size,
            self.config.overlap,
            format,
        )
    }

    /// Render a tile as an RGB image.
    ///
    /// Transparent source pixels are composited onto the source's background
    /// color. The returned image is exactly
    /// [`get_tile_dimensions`](Self::get_tile_dimensions) in size.
    pub fn get_tile(
        &self,
        level: usize,
        address: impl Into<TileAddress>,
    ) -> Result<RgbImage, DeepZoomError> {
        let geometry = self.tile_geometry(level, address)?;
        Ok(render_tile(&self.source, &geometry, self.background)?)
    }

    /// Arguments of the source region read for a tile.
    ///
    /// Callers who want to read the region themselves and skip resizing can
    /// use this instead of [`get_tile`](Self::get_tile).
    pub fn get_tile_coordinates(
        &self,
        level: usize,
        address: impl Into<TileAddress>,
    ) -> Result<TileCoordinates, DeepZoomError> {
        Ok(self.tile_geometry(level, address)?.coordinates)
    }

    /// Pixel size of a tile, computed without touching the source.
    pub fn get_tile_dimensions(
        &self,
        level: usize,
        address: impl Into<TileAddress>,
    ) -> Result<(u32, u32), DeepZoomError> {
        Ok(self.tile_geometry(level, address)?.target_size)
    }

    /// Full geometry of a tile.
    pub fn tile_geometry(
        &self,
        level: usize,
        address: impl Into<TileAddress>,
    ) -> Result<TileGeometry, DeepZoomError> {
        let address = address.into();
        let synthetic = self.levels.get(level).ok_or(DeepZoomError::InvalidLevel {
            level,
            level_count: self.levels.len(),
        })?;

        if address.column >= synthetic.tiles_x || address.row >= synthetic.tiles_y {
            return Err(DeepZoomError::AddressOutOfRange {
                level,
                column: address.column,
                row: address.row,
                tiles_x: synthetic.tiles_x,
                tiles_y: synthetic.tiles_y,
            });
        }

        let mapping = &self.mappings[level];
        let native = &self.native_levels[mapping.source_level];
        let ctx = GeometryContext {
            tile_size: self.config.tile_size,
            overlap: self.config.overlap,
            l0_offset: self.l0_offset,
            native_extent: (native.width, native.height),
            level: synthetic,
            mapping,
        };
        Ok(ctx.resolve(address))
    }
}

impl<S> fmt::Debug for DeepZoomGenerator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepZoomGenerator")
            .field("tile_size", &self.config.tile_size)
            .field("overlap", &self.config.overlap)
            .field("limit_bounds", &self.config.limit_bounds)
            .field("level_count", &self.levels.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
