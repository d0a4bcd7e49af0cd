//! Deep Zoom level hierarchy.
//!
//! Deep Zoom numbers its levels from the smallest image upwards:
//! - level 0 = 1x1 pixel
//! - last level = full resolution
//!
//! Each level halves the one above it, rounding up, so the chain is built
//! from the full size down and then reversed.

use serde::Serialize;

/// A single synthetic Deep Zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyntheticLevel {
    /// Level index (0 = 1x1)
    pub index: usize,

    /// Width of the level in pixels
    pub width: u32,

    /// Height of the level in pixels
    pub height: u32,

    /// Number of tile columns
    pub tiles_x: u32,

    /// Number of tile rows
    pub tiles_y: u32,
}

impl SyntheticLevel {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn tiles(&self) -> (u32, u32) {
        (self.tiles_x, self.tiles_y)
    }

    pub fn tile_count(&self) -> u64 {
        self.tiles_x as u64 * self.tiles_y as u64
    }
}

/// Halve `(width, height)` repeatedly down to 1x1.
///
/// Returns dimensions in ascending order: index 0 is `(1, 1)` and the last
/// entry is the input size.
pub fn level_dimensions(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut size = (width.max(1), height.max(1));
    let mut dimensions = vec![size];
    while size.0 > 1 || size.1 > 1 {
        size = (size.0.div_ceil(2).max(1), size.1.div_ceil(2).max(1));
        dimensions.push(size);
    }
    dimensions.reverse();
    dimensions
}

/// Build the full synthetic pyramid for a level 0 size and tile size.
pub fn build_levels(width: u32, height: u32, tile_size: u32) -> Vec<SyntheticLevel> {
    level_dimensions(width, height)
        .into_iter()
        .enumerate()
        .map(|(index, (w, h))| SyntheticLevel {
            index,
            width: w,
            height: h,
            tiles_x: w.div_ceil(tile_size),
            tiles_y: h.div_ceil(tile_size),
        })
        .collect()
}
