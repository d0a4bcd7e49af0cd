//! Slide abstraction layer.
//!
//! The Deep Zoom generator only sees a source through the [`SlideSource`]
//! trait. Each supported backing store provides one adapter.
//!
//! # Usage
//!
//! ```ignore
//! use dzi_pyramid::slide::{ImageSlide, SlideSource};
//!
//! // Decode an image and give it a native pyramid (4x per level)
//! let slide = ImageSlide::open("scan.png")?.with_native_levels(4);
//!
//! // Read a 256x256 region of native level 1, anchored at level 0 (1024, 0)
//! let region = slide.read_region((1024, 0), 1, (256, 256))?;
//! ```

mod image_slide;
mod source;

pub use image_slide::{ImageSlide, MIN_NATIVE_LEVEL_SIZE};
pub use source::{BoundsBox, SlideSource, SourceLevel, DEFAULT_BACKGROUND};
