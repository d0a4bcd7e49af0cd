//! Mapping from synthetic Deep Zoom levels onto native source levels.
//!
//! Each synthetic level has an exact power-of-two downsample relative to
//! level 0. The mapper picks the native level to read from and the residual
//! scale still needed after reading.

use serde::Serialize;

use crate::slide::{SlideSource, SourceLevel};

/// Native level choice for one synthetic level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelMapping {
    /// Native level index to read from
    pub source_level: usize,

    /// Downsample of the native level relative to level 0
    pub source_downsample: f64,

    /// Downsample of the synthetic level relative to level 0
    pub requested_downsample: f64,

    /// Additional scaling applied after extraction (`requested / source`)
    pub residual_scale: f64,
}

/// Downsample of synthetic level `level` in a pyramid of `level_count` levels.
///
/// The top level is 1.0 and every level below doubles it.
pub fn requested_downsample(level: usize, level_count: usize) -> f64 {
    debug_assert!(level < level_count);
    2f64.powi((level_count - level - 1) as i32)
}

/// Map every synthetic level onto the best native level.
pub fn map_levels<S: SlideSource + ?Sized>(
    source: &S,
    native_levels: &[SourceLevel],
    level_count: usize,
) -> Vec<LevelMapping> {
    (0..level_count)
        .map(|level| {
            let requested = requested_downsample(level, level_count);
            let source_level = source
                .best_level_for_downsample(requested)
                .min(native_levels.len().saturating_sub(1));
            let source_downsample = native_levels[source_level].downsample;
            LevelMapping {
                source_level,
                source_downsample,
                requested_downsample: requested,
                residual_scale: requested / source_downsample,
            }
        })
        .collect()
}
