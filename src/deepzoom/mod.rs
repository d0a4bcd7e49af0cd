//! Deep Zoom tiling engine.
//!
//! Builds a synthetic power-of-two pyramid over a [`SlideSource`](crate::slide::SlideSource)
//! and resolves tile addresses into source region reads.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DeepZoomGenerator             │
//! │  (tables computed once at construction) │
//! └────────────────────┬────────────────────┘
//!                      │
//!      ┌───────────────┼────────────────┐
//!      ▼               ▼                ▼
//! ┌──────────┐  ┌────────────┐  ┌──────────────┐
//! │  levels  │  │  mapping   │  │   geometry   │
//! │ (1x1 ..  │  │ (synthetic │  │ (address ->  │
//! │  full)   │  │  -> native)│  │  l0 region)  │
//! └──────────┘  └────────────┘  └──────┬───────┘
//!                                      ▼
//!                              ┌──────────────┐
//!                              │  compositor  │
//!                              │ (read, flat, │
//!                              │  resize)     │
//!                              └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use dzi_pyramid::deepzoom::{DeepZoomConfig, DeepZoomGenerator};
//! use dzi_pyramid::slide::ImageSlide;
//! use image::{DynamicImage, RgbImage};
//!
//! let slide = ImageSlide::new(DynamicImage::ImageRgb8(RgbImage::new(300, 250)));
//! let dz = DeepZoomGenerator::new(slide, DeepZoomConfig::default()).unwrap();
//!
//! assert_eq!(dz.level_count(), 10);
//! assert_eq!(dz.get_tile_dimensions(9, (1, 0)).unwrap(), (47, 250));
//! let tile = dz.get_tile(9, (1, 0)).unwrap();
//! assert_eq!(tile.dimensions(), (47, 250));
//! ```

pub mod compositor;
mod dzi;
mod generator;
mod geometry;
mod levels;
mod mapping;

pub use dzi::{generate_dzi_xml, tile_file_name, TileFormat, DZI_NAMESPACE};
pub use generator::{
    DeepZoomConfig, DeepZoomGenerator, LevelSummary, PyramidSummary, DEFAULT_OVERLAP,
    DEFAULT_TILE_SIZE,
};
pub use geometry::{TileAddress, TileCoordinates, TileGeometry};
pub use levels::{build_levels, level_dimensions, SyntheticLevel};
pub use mapping::{requested_downsample, LevelMapping};
