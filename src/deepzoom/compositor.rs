//! Region compositing: source region to final RGB tile.
//!
//! The source hands back straight RGBA at native resolution. The compositor
//! flattens it onto the slide background and, when the native region does not
//! already have the tile's exact size, resamples it with Lanczos3. The same
//! filter is always used so rendered tiles are reproducible.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use tracing::trace;

use crate::error::SourceError;
use crate::slide::SlideSource;

use super::geometry::TileGeometry;

/// Resampling filter used for every residual resize.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Flatten straight RGBA onto an opaque background color.
pub fn composite_over(region: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let (width, height) = region.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = region.get_pixel(x, y).0;
        match a {
            255 => Rgb([r, g, b]),
            0 => background,
            _ => {
                let a = a as u32;
                let blend =
                    |c: u8, bg: u8| ((c as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
                Rgb([
                    blend(r, background[0]),
                    blend(g, background[1]),
                    blend(b, background[2]),
                ])
            }
        }
    })
}

/// Resize a tile to exactly `target`, skipping the work when it already fits.
pub fn scale_to(tile: RgbImage, target: (u32, u32)) -> RgbImage {
    if tile.dimensions() == target {
        return tile;
    }
    imageops::resize(&tile, target.0, target.1, RESAMPLE_FILTER)
}

/// Read the region described by `geometry` and turn it into the final tile.
///
/// Source errors are returned as-is.
pub fn render_tile<S: SlideSource + ?Sized>(
    source: &S,
    geometry: &TileGeometry,
    background: Rgb<u8>,
) -> Result<RgbImage, SourceError> {
    let coords = &geometry.coordinates;
    trace!(
        location = ?coords.location,
        source_level = coords.source_level,
        size = ?coords.size,
        target = ?geometry.target_size,
        "Reading source region"
    );

    let region = source.read_region(coords.location, coords.source_level, coords.size)?;
    let tile = composite_over(&region, background);
    Ok(scale_to(tile, geometry.target_size))
}
