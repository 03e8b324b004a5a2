//! Temporary artifact management with guaranteed release.
//!
//! Each pipeline run owns one [`ArtifactStore`] rooted at a fresh run
//! directory. Allocated paths are unique, never reused, and released exactly
//! once when the run ends; the `Drop` implementation is the backstop that
//! makes release happen on every exit path.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PipelineError;

/// Allocates and releases temporary file artifacts for one pipeline run.
#[derive(Debug)]
pub struct ArtifactStore {
    /// Per-run directory holding every allocation.
    run_dir: PathBuf,
    /// Paths allocated and not yet released.
    allocated: Vec<PathBuf>,
    /// Whether the store has been fully released.
    released: bool,
}

impl ArtifactStore {
    /// Create a store rooted at a fresh run directory under `temp_root`.
    pub fn create(temp_root: &Path) -> Result<Self, PipelineError> {
        let run_dir = temp_root.join(format!("run__{}", Uuid::now_v7().simple()));
        std::fs::create_dir_all(&run_dir)?;
        debug!(run_dir = %run_dir.display(), "Created artifact run directory");

        Ok(Self {
            run_dir,
            allocated: Vec::new(),
            released: false,
        })
    }

    /// Allocate a unique, not-yet-existing artifact path
    /// `[stem]__[uuid].[suffix]` inside the run directory.
    pub fn allocate(&mut self, stem: &str, suffix: &str) -> PathBuf {
        let name = format!(
            "{}__{}.{}",
            stem,
            Uuid::now_v7().simple(),
            suffix.trim_start_matches('.')
        );
        let path = self.run_dir.join(name);
        self.allocated.push(path.clone());
        debug!(path = %path.display(), "Allocated artifact path");
        path
    }

    /// Release one path: delete the file if it exists.
    ///
    /// Idempotent; never fails the caller. Deletion problems are logged and
    /// swallowed, and an already-absent file is not a problem at all.
    pub fn release(&mut self, path: &Path) {
        Self::delete_file(path);
        self.allocated.retain(|p| p != path);
    }

    /// Release every remaining allocation and remove the run directory.
    ///
    /// Idempotent: a second call is a no-op.
    pub fn release_all(&mut self) {
        if self.released {
            return;
        }
        for path in self.allocated.drain(..) {
            Self::delete_file(&path);
        }
        if let Err(e) = std::fs::remove_dir_all(&self.run_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    run_dir = %self.run_dir.display(),
                    error = %e,
                    "Failed to remove artifact run directory"
                );
            }
        }
        self.released = true;
    }

    fn delete_file(path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Released artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "Failed to release artifact"
            ),
        }
    }

    /// The run directory this store owns.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Paths allocated and not yet released.
    pub fn allocated(&self) -> &[PathBuf] {
        &self.allocated
    }
}

impl Drop for ArtifactStore {
    fn drop(&mut self) {
        self.release_all();
    }
}
