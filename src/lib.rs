//! # dzi-pyramid
//!
//! Deep Zoom pyramids over arbitrarily large multi-resolution images.
//!
//! A [`DeepZoomGenerator`] exposes a virtual tile pyramid (one level per
//! halving of the image, fixed-size tiles with optional overlap) over any
//! [`SlideSource`]. Viewers can request any tile at any level without the full
//! image ever being materialized at that level: each tile maps onto a single
//! region read from the best native level of the source, followed by a
//! residual resize.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`deepzoom`] - Level pyramid, native level mapping, tile geometry, compositing
//! - [`slide`] - Source capability trait and the in-memory image adapter
//! - [`mod@format`] - Premultiplied ARGB to straight RGBA conversion
//! - [`tile`] - Tile encoding and the static Deep Zoom tree writer
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use dzi_pyramid::{DeepZoomConfig, DeepZoomGenerator, ImageSlide};
//!
//! let slide = ImageSlide::open("scan.png").unwrap().with_native_levels(4);
//! let dz = DeepZoomGenerator::new(slide, DeepZoomConfig::default()).unwrap();
//!
//! println!("{}", dz.get_dzi("jpeg").unwrap());
//! let top = dz.level_count() - 1;
//! let tile = dz.get_tile(top, (0, 0)).unwrap();
//! tile.save("0_0.png").unwrap();
//! ```

pub mod config;
pub mod deepzoom;
pub mod error;
pub mod format;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, InfoConfig, PyramidArgs, TileConfig};
pub use deepzoom::{
    generate_dzi_xml, DeepZoomConfig, DeepZoomGenerator, LevelMapping, SyntheticLevel,
    TileAddress, TileCoordinates, TileFormat, TileGeometry, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE,
};
pub use error::{DeepZoomError, SourceError, TileError};
pub use format::argb_to_rgba;
pub use slide::{BoundsBox, ImageSlide, SlideSource, SourceLevel};
pub use tile::{StaticTiler, TileEncoder, TilerReport, DEFAULT_JPEG_QUALITY};
