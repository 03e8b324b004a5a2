//! Error type for mesh and boundary-representation operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from geometry construction and mesh interchange.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The mesh carries no triangles.
    #[error("mesh contains no triangles")]
    EmptyMesh,

    /// The shape carries no faces.
    #[error("shape contains no faces")]
    EmptyShape,

    /// The shape has open edges and cannot bound a volume.
    #[error("shape is not closed: {open_edges} edge(s) bound only one face")]
    NotClosed {
        /// Number of edges bounding exactly one face.
        open_edges: usize,
    },

    /// The shape has edges shared by more than two faces.
    #[error("shape is non-manifold: {edges} edge(s) shared by more than two faces")]
    NonManifold {
        /// Number of over-shared edges.
        edges: usize,
    },

    /// The shape encloses no volume (all faces degenerate or cancelling).
    #[error("shape encloses no volume")]
    ZeroVolume,

    /// An STL file could not be parsed.
    #[error("failed to parse STL file '{path}': {reason}")]
    StlParse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
