//! Tile encoder.
//!
//! Turns rendered RGB tiles into JPEG or PNG bytes.
//!
//! # Design Decisions
//!
//! - **Quality control**: JPEG quality is fixed per encoder, so every tile of a
//!   pyramid is encoded the same way. PNG ignores it.
//!
//! - **No resizing**: tiles arrive at their final size from the generator.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::deepzoom::TileFormat;
use crate::error::TileError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Tile Encoder
// =============================================================================

/// Encoder for rendered tiles.
///
/// # Example
///
/// ```
/// use dzi_pyramid::deepzoom::TileFormat;
/// use dzi_pyramid::tile::TileEncoder;
/// use image::RgbImage;
///
/// let encoder = TileEncoder::new(TileFormat::Jpeg, 85).unwrap();
/// let bytes = encoder.encode(&RgbImage::new(8, 8)).unwrap();
/// assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEncoder {
    format: TileFormat,
    quality: u8,
}

impl Default for TileEncoder {
    fn default() -> Self {
        Self {
            format: TileFormat::Jpeg,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl TileEncoder {
    /// Create an encoder.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuality` if `quality` is outside 1-100.
    pub fn new(format: TileFormat, quality: u8) -> Result<Self, TileError> {
        if !is_valid_quality(quality) {
            return Err(TileError::InvalidQuality { quality });
        }
        Ok(Self { format, quality })
    }

    pub fn format(&self) -> TileFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a tile.
    pub fn encode(&self, tile: &RgbImage) -> Result<Bytes, TileError> {
        let mut output = Vec::new();
        let (width, height) = tile.dimensions();

        let result = match self.format {
            TileFormat::Jpeg => JpegEncoder::new_with_quality(&mut output, self.quality)
                .write_image(tile.as_raw(), width, height, ExtendedColorType::Rgb8),
            TileFormat::Png => PngEncoder::new(&mut output).write_image(
                tile.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
        };

        result.map_err(|e| TileError::Encode {
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

// =============================================================================
// Tests
// =============================================================================
