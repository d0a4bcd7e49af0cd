//! Tile output layer.
//!
//! This module turns rendered tiles into files:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              StaticTiler                │
//! │   (walks every level, bounded workers)  │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │DeepZoomGenerator│    │    TileEncoder      │
//! │ (render tile)   │    │  (JPEG / PNG bytes) │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileEncoder`]: Encodes RGB tiles as JPEG (with quality) or PNG
//! - [`StaticTiler`]: Writes a `.dzi` descriptor and the `_files/` tile tree
//! - [`TilerReport`]: Counts of written and skipped tiles

mod encoder;
mod writer;

pub use encoder::{
    is_valid_quality, TileEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use writer::{StaticTiler, TilerReport, DEFAULT_JOBS};
