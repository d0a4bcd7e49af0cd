use thiserror::Error;

/// Errors raised by an image source while reporting metadata or reading pixels
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Native level index is not part of the source pyramid
    #[error("Native level {level} out of range: source has {level_count} levels")]
    LevelOutOfRange { level: usize, level_count: usize },

    /// Region request the source cannot satisfy
    #[error("Invalid region: {message}")]
    InvalidRegion { message: String },

    /// Source could not be opened or decoded
    #[error("Failed to open source: {0}")]
    Open(String),

    /// Any other backend failure
    #[error("Source error: {0}")]
    Other(String),
}

/// Errors surfaced by the Deep Zoom generator
#[derive(Debug, Clone, Error)]
pub enum DeepZoomError {
    /// Invalid construction parameters (tile size, overlap)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Deep Zoom level outside the pyramid
    #[error("Invalid level {level}: pyramid has {level_count} levels")]
    InvalidLevel { level: usize, level_count: usize },

    /// Tile address outside the level's tile grid
    #[error(
        "Invalid address ({column}, {row}) at level {level}: grid is {tiles_x}x{tiles_y} tiles"
    )]
    AddressOutOfRange {
        level: usize,
        column: u32,
        row: u32,
        tiles_x: u32,
        tiles_y: u32,
    },

    /// Invalid argument to an operation (e.g. unknown tile format)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the underlying source, passed through unchanged
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl DeepZoomError {
    /// Whether this error was caused by a level or tile address outside the pyramid.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            DeepZoomError::InvalidLevel { .. } | DeepZoomError::AddressOutOfRange { .. }
        )
    }
}

/// Errors from the tile output pipeline (encoding and writing tiles)
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Tile could not be rendered
    #[error(transparent)]
    DeepZoom(#[from] DeepZoomError),

    /// Encoding the rendered tile failed
    #[error("Failed to encode tile: {message}")]
    Encode { message: String },

    /// Filesystem failure while writing output
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// JPEG quality outside 1-100
    #[error("Invalid JPEG quality {quality}: must be between 1 and 100")]
    InvalidQuality { quality: u8 },

    /// A tile worker panicked or was cancelled
    #[error("Tile worker failed: {message}")]
    Worker { message: String },
}

impl TileError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        TileError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}
