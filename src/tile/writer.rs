//! Static Deep Zoom tree writer.
//!
//! Renders every tile of a generator to disk:
//!
//! ```text
//! <base>.dzi
//! <base>_files/
//!   0/0_0.jpeg
//!   1/0_0.jpeg
//!   ...
//!   <top>/<col>_<row>.jpeg
//! ```
//!
//! Rendering and encoding are CPU-bound, so each tile runs on the blocking
//! pool. A semaphore bounds the number of tiles in flight to `jobs`. Tiles
//! already present on disk are skipped, so an interrupted run can resume.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use crate::deepzoom::{tile_file_name, DeepZoomGenerator};
use crate::error::TileError;
use crate::slide::SlideSource;

use super::encoder::TileEncoder;

/// Default number of concurrent tile workers.
pub const DEFAULT_JOBS: usize = 4;

/// Progress is logged every this many tiles.
const PROGRESS_INTERVAL: u64 = 100;

/// Outcome of a tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TilerReport {
    /// Tiles rendered and written in this run
    pub written: u64,

    /// Tiles that already existed on disk
    pub skipped: u64,

    /// Total tiles in the pyramid
    pub total: u64,
}

/// Writes a complete Deep Zoom directory tree for one generator.
pub struct StaticTiler<S> {
    generator: Arc<DeepZoomGenerator<S>>,
    encoder: TileEncoder,
    basename: PathBuf,
    jobs: usize,
}

impl<S: SlideSource + 'static> StaticTiler<S> {
    /// Create a tiler writing `<basename>.dzi` and `<basename>_files/`.
    pub fn new(
        generator: Arc<DeepZoomGenerator<S>>,
        encoder: TileEncoder,
        basename: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            encoder,
            basename: basename.into(),
            jobs: DEFAULT_JOBS,
        }
    }

    /// Set the number of concurrent tile workers (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Path of the `.dzi` descriptor.
    pub fn dzi_path(&self) -> PathBuf {
        with_suffix(&self.basename, ".dzi")
    }

    /// Directory holding the per-level tile directories.
    pub fn tiles_dir(&self) -> PathBuf {
        with_suffix(&self.basename, "_files")
    }

    /// Render all tiles and write the descriptor.
    ///
    /// Stops at the first failing tile and returns its error.
    pub async fn run(&self) -> Result<TilerReport, TileError> {
        let format = self.encoder.format();
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks: JoinSet<Result<(), TileError>> = JoinSet::new();
        let mut progress = Progress::new(self.generator.tile_count());

        for (level, &(cols, rows)) in self.generator.level_tiles().iter().enumerate() {
            let dir = self.tiles_dir().join(level.to_string());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| TileError::io(&dir, e))?;

            for row in 0..rows {
                for col in 0..cols {
                    let path = dir.join(tile_file_name(col, row, format));
                    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                        debug!(path = %path.display(), "Tile exists, skipping");
                        progress.skipped();
                        continue;
                    }

                    let permit = Arc::clone(&semaphore)
                        .acquire_owned()
                        .await
                        .map_err(|e| TileError::Worker {
                            message: e.to_string(),
                        })?;
                    let generator = Arc::clone(&self.generator);
                    let encoder = self.encoder;
                    tasks.spawn_blocking(move || {
                        let _permit = permit;
                        write_tile(&generator, &encoder, level, col, row, &path)
                    });

                    while let Some(joined) = tasks.try_join_next() {
                        finish(joined)?;
                        progress.written();
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            finish(joined)?;
            progress.written();
        }

        let dzi_path = self.dzi_path();
        tokio::fs::write(&dzi_path, self.generator.dzi(format))
            .await
            .map_err(|e| TileError::io(&dzi_path, e))?;
        debug!(path = %dzi_path.display(), "Wrote DZI descriptor");

        Ok(progress.report)
    }
}

fn write_tile<S: SlideSource>(
    generator: &DeepZoomGenerator<S>,
    encoder: &TileEncoder,
    level: usize,
    col: u32,
    row: u32,
    path: &Path,
) -> Result<(), TileError> {
    let tile = generator.get_tile(level, (col, row))?;
    let bytes = encoder.encode(&tile)?;
    std::fs::write(path, &bytes).map_err(|e| TileError::io(path, e))
}

fn finish(joined: Result<Result<(), TileError>, JoinError>) -> Result<(), TileError> {
    joined.map_err(|e| TileError::Worker {
        message: e.to_string(),
    })?
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

struct Progress {
    report: TilerReport,
}

impl Progress {
    fn new(total: u64) -> Self {
        Self {
            report: TilerReport {
                total,
                ..TilerReport::default()
            },
        }
    }

    fn written(&mut self) {
        self.report.written += 1;
        self.log();
    }

    fn skipped(&mut self) {
        self.report.skipped += 1;
        self.log();
    }

    fn log(&self) {
        let done = self.report.written + self.report.skipped;
        if done % PROGRESS_INTERVAL == 0 || done == self.report.total {
            info!("Tiling: {}/{} tiles", done, self.report.total);
        }
    }
}
