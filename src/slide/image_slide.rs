//! In-memory slide backed by a decoded raster image.
//!
//! `ImageSlide` stores its pixels the way whole-slide backends return them:
//! native-endian premultiplied ARGB words. Coarser native levels can be
//! synthesized by box filtering in premultiplied space, which keeps
//! transparent margins from bleeding dark fringes into content.

use std::fmt;
use std::path::Path;

use image::{DynamicImage, Rgb, RgbaImage};
use tracing::debug;

use crate::error::SourceError;
use crate::format::{argb_to_rgba, premultiply};

use super::source::{BoundsBox, SlideSource, DEFAULT_BACKGROUND};

/// Native levels are synthesized until the largest side fits in this many pixels.
pub const MIN_NATIVE_LEVEL_SIZE: u32 = 256;

// =============================================================================
// Native Level Storage
// =============================================================================

struct NativeLevel {
    width: u32,
    height: u32,
    downsample: f64,
    /// Premultiplied ARGB, row-major
    pixels: Vec<u32>,
}

impl NativeLevel {
    /// Box-filter this level down by `factor` in each axis.
    fn reduce(&self, factor: u32, level0: (u32, u32)) -> NativeLevel {
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            let y0 = y * factor;
            let y1 = (y0 + factor).min(self.height);
            for x in 0..width {
                let x0 = x * factor;
                let x1 = (x0 + factor).min(self.width);

                let mut sums = [0u64; 4];
                for sy in y0..y1 {
                    let row = sy as usize * self.width as usize;
                    for sx in x0..x1 {
                        let word = self.pixels[row + sx as usize];
                        for (i, sum) in sums.iter_mut().enumerate() {
                            *sum += ((word >> (24 - 8 * i)) & 0xFF) as u64;
                        }
                    }
                }

                let count = ((x1 - x0) * (y1 - y0)) as u64;
                let word = sums
                    .iter()
                    .fold(0u32, |acc, &s| acc << 8 | ((s + count / 2) / count) as u32);
                pixels.push(word);
            }
        }

        // Mean of per-axis ratios, as whole-slide libraries report it
        let downsample = (level0.0 as f64 / width as f64 + level0.1 as f64 / height as f64) / 2.0;

        NativeLevel {
            width,
            height,
            downsample,
            pixels,
        }
    }
}

// =============================================================================
// ImageSlide
// =============================================================================

/// A `SlideSource` over an image held in memory.
pub struct ImageSlide {
    levels: Vec<NativeLevel>,
    bounds: Option<BoundsBox>,
    background: Rgb<u8>,
}

impl ImageSlide {
    /// Wrap a decoded image as a single-level slide.
    pub fn new(image: DynamicImage) -> Self {
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| premultiply(p.0)).collect();

        Self {
            levels: vec![NativeLevel {
                width,
                height,
                downsample: 1.0,
                pixels,
            }],
            bounds: None,
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Decode an image file into a single-level slide.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| SourceError::Open(format!("{}: {}", path.display(), e)))?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Decoded source image"
        );
        Ok(Self::new(image))
    }

    /// Synthesize coarser native levels, each `factor` times smaller than the last.
    ///
    /// Stops once the largest side is at most [`MIN_NATIVE_LEVEL_SIZE`]. A
    /// factor below 2 leaves the slide unchanged. Existing synthesized levels
    /// are replaced.
    pub fn with_native_levels(mut self, factor: u32) -> Self {
        self.levels.truncate(1);
        if factor < 2 {
            return self;
        }

        let level0 = (self.levels[0].width, self.levels[0].height);
        loop {
            let last = &self.levels[self.levels.len() - 1];
            if last.width.max(last.height) <= MIN_NATIVE_LEVEL_SIZE {
                break;
            }
            let next = last.reduce(factor, level0);
            self.levels.push(next);
        }

        debug!(
            factor,
            level_count = self.levels.len(),
            "Synthesized native pyramid"
        );
        self
    }

    /// Restrict the reported content area.
    pub fn with_bounds(mut self, bounds: BoundsBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the color composited behind transparent pixels.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    /// Compute the bounding box of all pixels with non-zero alpha.
    ///
    /// Returns `None` when the image is fully opaque (the box would be the
    /// whole image) or fully transparent (there is no content).
    pub fn detect_bounds(&self) -> Option<BoundsBox> {
        let level = &self.levels[0];
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        let mut opaque = true;

        for (i, &word) in level.pixels.iter().enumerate() {
            let alpha = word >> 24;
            if alpha != 0xFF {
                opaque = false;
            }
            if alpha == 0 {
                continue;
            }
            let x = (i % level.width as usize) as u32;
            let y = (i / level.width as usize) as u32;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        if opaque || min_x == u32::MAX {
            return None;
        }
        Some(BoundsBox::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

impl fmt::Debug for ImageSlide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<(u32, u32)> = self.levels.iter().map(|l| (l.width, l.height)).collect();
        f.debug_struct("ImageSlide")
            .field("levels", &dims)
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl SlideSource for ImageSlide {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
        self.levels.get(level).map(|l| (l.width, l.height))
    }

    fn level_downsample(&self, level: usize) -> Option<f64> {
        self.levels.get(level).map(|l| l.downsample)
    }

    fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<RgbaImage, SourceError> {
        let native = self
            .levels
            .get(level)
            .ok_or(SourceError::LevelOutOfRange {
                level,
                level_count: self.levels.len(),
            })?;

        let (width, height) = size;
        // Top-left corner in this level's pixel frame
        let origin_x = (location.0 as f64 / native.downsample).floor() as i64;
        let origin_y = (location.1 as f64 / native.downsample).floor() as i64;

        let mut words = vec![0u32; width as usize * height as usize];
        for y in 0..height as i64 {
            let sy = origin_y + y;
            if sy < 0 || sy >= native.height as i64 {
                continue;
            }
            let src_row = sy as usize * native.width as usize;
            let dst_row = y as usize * width as usize;
            for x in 0..width as i64 {
                let sx = origin_x + x;
                if sx < 0 || sx >= native.width as i64 {
                    continue;
                }
                words[dst_row + x as usize] = native.pixels[src_row + sx as usize];
            }
        }

        let mut buf: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
        argb_to_rgba(&mut buf)?;

        RgbaImage::from_raw(width, height, buf).ok_or_else(|| SourceError::InvalidRegion {
            message: format!("region buffer does not match {}x{}", width, height),
        })
    }

    fn bounds(&self) -> Option<BoundsBox> {
        self.bounds
    }

    fn background_color(&self) -> Rgb<u8> {
        self.background
    }
}

// =============================================================================
// Tests
// =============================================================================
