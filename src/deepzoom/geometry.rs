//! Tile geometry: from a tile address to a source region request.
//!
//! Four coordinate frames are involved:
//! - tile column/row within the Deep Zoom level (`t`)
//! - pixel coordinates within the Deep Zoom level (`z`)
//! - pixel coordinates within the chosen native level (`l`)
//! - pixel coordinates within native level 0 (`l0`)
//!
//! Locations are rounded down and sizes rounded up so that adjacent tiles
//! always cover each other's edge pixels.

use serde::Serialize;

use super::levels::SyntheticLevel;
use super::mapping::LevelMapping;

/// Column and row of a tile within a Deep Zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileAddress {
    pub column: u32,
    pub row: u32,
}

impl TileAddress {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl From<(u32, u32)> for TileAddress {
    fn from((column, row): (u32, u32)) -> Self {
        Self { column, row }
    }
}

/// Arguments for a source region read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoordinates {
    /// Top-left corner in level 0 coordinates
    pub location: (i64, i64),

    /// Native level to read from
    pub source_level: usize,

    /// Region size in pixels of the native level
    pub size: (u32, u32),
}

/// Fully resolved geometry of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileGeometry {
    /// Region read from the source
    pub coordinates: TileCoordinates,

    /// Region size expressed in level 0 pixels
    pub level0_size: (u32, u32),

    /// Final pixel size of the tile
    pub target_size: (u32, u32),

    /// Scale applied between the native region and the final tile
    pub residual_scale: f64,
}

/// Fixed inputs shared by every tile of a generator.
#[derive(Debug, Clone, Copy)]
pub struct GeometryContext<'a> {
    pub tile_size: u32,
    pub overlap: u32,
    /// Level 0 offset of the active area
    pub l0_offset: (u32, u32),
    /// Extent of the chosen native level, limited to the active area
    pub native_extent: (u32, u32),
    pub level: &'a SyntheticLevel,
    pub mapping: &'a LevelMapping,
}

struct AxisSpan {
    l0_location: i64,
    l_size: u32,
    z_size: u32,
}

impl GeometryContext<'_> {
    /// Resolve the geometry of a tile already known to be in range.
    pub fn resolve(&self, address: TileAddress) -> TileGeometry {
        let x = self.axis(
            address.column,
            self.level.tiles_x,
            self.level.width,
            self.native_extent.0,
            self.l0_offset.0,
        );
        let y = self.axis(
            address.row,
            self.level.tiles_y,
            self.level.height,
            self.native_extent.1,
            self.l0_offset.1,
        );

        let l0_downsample = self.mapping.source_downsample;
        let to_level0 = |l: u32| (l as f64 * l0_downsample).round() as u32;

        TileGeometry {
            coordinates: TileCoordinates {
                location: (x.l0_location, y.l0_location),
                source_level: self.mapping.source_level,
                size: (x.l_size, y.l_size),
            },
            level0_size: (to_level0(x.l_size), to_level0(y.l_size)),
            target_size: (x.z_size, y.z_size),
            residual_scale: self.mapping.residual_scale,
        }
    }

    fn axis(&self, t: u32, t_lim: u32, z_lim: u32, l_lim: u32, l0_offset: u32) -> AxisSpan {
        let tile_size = self.tile_size as u64;
        let overlap = self.overlap as u64;
        let t = t as u64;

        // Overlap only on interior edges
        let overlap_tl = if t != 0 { overlap } else { 0 };
        let overlap_br = if t != t_lim as u64 - 1 { overlap } else { 0 };

        let z_size = tile_size.min(z_lim as u64 - tile_size * t) + overlap_tl + overlap_br;
        let z_location = tile_size * t - overlap_tl;

        let l_z_downsample = self.mapping.residual_scale;
        let l_location = l_z_downsample * z_location as f64;
        let l0_location =
            (self.mapping.source_downsample * l_location).floor() as i64 + l0_offset as i64;

        let l_size = (l_z_downsample * z_size as f64)
            .ceil()
            .min(l_lim as f64 - l_location.ceil())
            .max(1.0) as u32;

        AxisSpan {
            l0_location,
            l_size,
            z_size: z_size as u32,
        }
    }
}
