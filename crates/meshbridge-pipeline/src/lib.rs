//! # MeshBridge Pipeline
//!
//! Converts a surface mesh held in a host document into a solid body by
//! delegating the geometric transform to Blender in headless batch mode.
//!
//! The pipeline stages the input mesh as an STL artifact, invokes the
//! external tool with a transform script and parameters, imports the
//! processed artifact back into the document, reconstructs a closed solid
//! from the returned mesh and assigns it to the caller-owned target object.
//! Every temporary file and every intermediate document object created along
//! the way is released on every exit path, success or failure.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod import;
pub mod invoke;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod request;
pub mod solid;

pub use artifacts::ArtifactStore;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use import::MeshImporter;
pub use invoke::{BlenderInvoker, Invocation};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use pipeline::{PipelineReport, PipelineStage, SolidifyPipeline};
pub use registry::IntermediateRegistry;
pub use request::{ProcessingRequest, ScriptParam};
pub use solid::SolidBuilder;
