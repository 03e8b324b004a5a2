//! Unified error type for the conversion pipeline.
//!
//! Every stage failure is one of these variants; all are fatal to the
//! current run, trigger the cleanup phase, and are re-surfaced to the
//! caller unchanged.

use std::path::PathBuf;

use thiserror::Error;

use meshbridge_geometry::GeometryError;

/// Maximum stderr length carried inside an error value; the full text is
/// still written to the log.
pub(crate) const STDERR_ERROR_LIMIT: usize = 2000;

/// Unified error type for all pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    // --- Preconditions ---
    /// No source object was supplied, or it is absent from the document.
    #[error("no input object to process")]
    NoInputObject,

    /// The caller-owned target object is absent from the document.
    #[error("target object '{name}' not found in document")]
    TargetNotFound {
        /// The target name that was looked up.
        name: String,
    },

    // --- External tool invocation ---
    /// The external tool executable could not be found.
    #[error("external tool executable not found: {path}")]
    ToolNotFound {
        /// The executable path or name that failed to resolve.
        path: PathBuf,
    },

    /// The external tool exited with a non-zero status.
    #[error("external tool failed with exit code {exit_code}: {stderr}")]
    ToolExecutionFailed {
        /// The exit code (-1 when terminated by signal).
        exit_code: i32,
        /// Captured stderr output, truncated.
        stderr: String,
    },

    /// The external tool exceeded the configured watchdog timeout.
    #[error("external tool timed out after {seconds}s")]
    ToolTimedOut {
        /// The timeout that was exceeded.
        seconds: u64,
    },

    // --- Import ---
    /// The expected output artifact does not exist.
    #[error("expected output artifact missing: {path}")]
    MissingOutputArtifact {
        /// The artifact path that was checked.
        path: PathBuf,
    },

    /// The imported entity could not be located in the document.
    #[error("imported entity '{name}' not found in document")]
    ImportedEntityNotFound {
        /// The expected entity name derived from the artifact stem.
        name: String,
    },

    // --- Reconstruction ---
    /// The object does not carry usable mesh topology data.
    #[error("object '{name}' does not carry usable mesh data")]
    InvalidMeshObject {
        /// The offending object name.
        name: String,
    },

    /// The shape could not be closed into a solid.
    #[error("failed to build a closed solid: {source}")]
    SolidificationFailed {
        /// The underlying geometric failure.
        #[source]
        source: GeometryError,
    },

    // --- Ambient ---
    /// Geometry error outside the solidification step.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<meshbridge_document::DocumentError> for PipelineError {
    fn from(err: meshbridge_document::DocumentError) -> Self {
        match err {
            meshbridge_document::DocumentError::MeshLoad(e) => Self::Geometry(e),
        }
    }
}
