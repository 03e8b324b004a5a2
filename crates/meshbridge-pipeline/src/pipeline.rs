//! Pipeline orchestration: stage sequencing and all-paths cleanup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use meshbridge_document::Document;

use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::import::MeshImporter;
use crate::invoke::BlenderInvoker;
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use crate::registry::IntermediateRegistry;
use crate::request::ProcessingRequest;
use crate::solid::SolidBuilder;

/// Runtime stage of a pipeline run.
///
/// Legal transitions:
/// - `Idle` -> `Exporting` -> `Invoking` -> `Importing` -> `Reconstructing`
///   -> `AssigningResult` -> `CleaningUp` -> `Done`
/// - any stage -> `CleaningUp` -> `Failed` on the first stage failure
///
/// `CleaningUp` runs on every path; no other skips or reversions occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// No run in progress.
    Idle,
    /// Writing the source mesh to the input artifact.
    Exporting,
    /// Running the external tool.
    Invoking,
    /// Loading the output artifact into the document.
    Importing,
    /// Rebuilding shape and solid from the imported mesh.
    Reconstructing,
    /// Assigning the solid to the caller-owned target.
    AssigningResult,
    /// Releasing artifacts and intermediate objects.
    CleaningUp,
    /// Run completed successfully.
    Done,
    /// Run failed; the failure has been re-surfaced to the caller.
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Exporting => "Exporting",
            Self::Invoking => "Invoking",
            Self::Importing => "Importing",
            Self::Reconstructing => "Reconstructing",
            Self::AssigningResult => "AssigningResult",
            Self::CleaningUp => "CleaningUp",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// Telemetry for one successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The target object the solid was assigned to.
    pub target: String,
    /// Wall-clock duration of the whole run, cleanup included.
    pub duration: Duration,
    /// Enclosed volume of the produced solid.
    pub solid_volume: f64,
    /// Temporary artifacts released during cleanup.
    pub artifacts_released: usize,
    /// Intermediate document objects removed during cleanup.
    pub intermediates_removed: usize,
}

/// Orchestrates the solidify conversion pipeline.
///
/// Each [`run`](Self::run) gets its own artifact store and intermediate
/// registry, so runs against distinct documents may proceed concurrently.
#[derive(Debug, Clone)]
pub struct SolidifyPipeline {
    /// Pipeline configuration.
    config: PipelineConfig,
    /// Root directory for per-run artifact stores.
    temp_root: PathBuf,
    /// Run metrics.
    metrics: Arc<PipelineMetrics>,
}

impl SolidifyPipeline {
    /// Create a pipeline, materializing the temp root directory.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let temp_root = config.effective_temp_root();
        std::fs::create_dir_all(&temp_root)?;

        Ok(Self {
            config,
            temp_root,
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The metrics collector.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// A point-in-time metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run one conversion: process `request.source()` through the external
    /// tool and assign the resulting solid to `target`'s shape.
    ///
    /// On failure the target is left untouched, and in every outcome no
    /// temporary file or intermediate document object created by this run
    /// survives it.
    #[instrument(skip(self, doc, request), fields(source = %request.source()))]
    pub async fn run(
        &self,
        doc: &mut Document,
        request: &ProcessingRequest,
        target: &str,
    ) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        self.metrics.record_started();
        let mut stage = PipelineStage::Idle;

        // Preconditions are checked before any artifact exists, so a
        // refused run leaves nothing to clean.
        if let Err(e) = Self::check_preconditions(doc, request, target) {
            advance(&mut stage, PipelineStage::CleaningUp);
            advance(&mut stage, PipelineStage::Failed);
            self.metrics.record_failure();
            error!(error = %e, "Pipeline refused");
            return Err(e);
        }

        let mut store = match ArtifactStore::create(&self.temp_root) {
            Ok(store) => store,
            Err(e) => {
                self.metrics.record_failure();
                return Err(e);
            }
        };
        let mut registry = IntermediateRegistry::new();

        let result = self
            .run_stages(doc, request, target, &mut store, &mut registry, &mut stage)
            .await;

        // Cleanup phase: unconditional, regardless of which stage failed.
        advance(&mut stage, PipelineStage::CleaningUp);
        let artifacts_released = store.allocated().len();
        store.release_all();
        let intermediates_removed = registry.cleanup(doc);
        debug!(
            artifacts_released,
            intermediates_removed, "Cleanup phase complete"
        );

        let duration = start.elapsed();
        match result {
            Ok(solid_volume) => {
                advance(&mut stage, PipelineStage::Done);
                self.metrics.record_success(duration);
                info!(
                    elapsed_ms = duration.as_millis() as u64,
                    solid_volume, "Pipeline run complete"
                );
                Ok(PipelineReport {
                    target: target.to_string(),
                    duration,
                    solid_volume,
                    artifacts_released,
                    intermediates_removed,
                })
            }
            Err(e) => {
                advance(&mut stage, PipelineStage::Failed);
                self.metrics.record_failure();
                error!(error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    fn check_preconditions(
        doc: &Document,
        request: &ProcessingRequest,
        target: &str,
    ) -> Result<(), PipelineError> {
        if request.source().is_empty() || doc.get(request.source()).is_none() {
            return Err(PipelineError::NoInputObject);
        }
        if doc.get(target).is_none() {
            return Err(PipelineError::TargetNotFound {
                name: target.to_string(),
            });
        }
        Ok(())
    }

    /// The fallible stage sequence. Every early return lands in the caller's
    /// unconditional cleanup phase.
    async fn run_stages(
        &self,
        doc: &mut Document,
        request: &ProcessingRequest,
        target: &str,
        store: &mut ArtifactStore,
        registry: &mut IntermediateRegistry,
        stage: &mut PipelineStage,
    ) -> Result<f64, PipelineError> {
        advance(stage, PipelineStage::Exporting);
        let input_path = store.allocate("solidify_input", "stl");
        let output_path = store.allocate("solidify_output", "stl");
        self.export_source(doc, request.source(), &input_path)?;

        advance(stage, PipelineStage::Invoking);
        let invoker = BlenderInvoker::from_config(&self.config);
        let mut args = vec![
            input_path.to_string_lossy().to_string(),
            output_path.to_string_lossy().to_string(),
        ];
        args.extend(request.encoded_params());
        invoker.run(request.script(), &args).await?;

        advance(stage, PipelineStage::Importing);
        let mesh_object = MeshImporter::import(doc, &output_path, registry)?;

        advance(stage, PipelineStage::Reconstructing);
        let shape_object = SolidBuilder::shape_from_mesh(doc, &mesh_object, registry)?;
        let (_solid_object, solid) = SolidBuilder::solid_from_shape(doc, &shape_object, registry)?;

        advance(stage, PipelineStage::AssigningResult);
        let solid_volume = solid.volume();
        let target_obj = doc
            .get_mut(target)
            .ok_or_else(|| PipelineError::TargetNotFound {
                name: target.to_string(),
            })?;
        // Assigned by value: the target outlives the intermediate solid
        // feature removed during cleanup.
        target_obj.set_shape(solid);
        doc.recompute();

        Ok(solid_volume)
    }

    /// Write the source object's surface to the input artifact.
    ///
    /// Mesh-bearing sources are exported directly; shape-bearing sources are
    /// tessellated first.
    fn export_source(
        &self,
        doc: &Document,
        source: &str,
        input_path: &std::path::Path,
    ) -> Result<(), PipelineError> {
        let object = doc.get(source).ok_or(PipelineError::NoInputObject)?;

        let mesh = match object.data() {
            meshbridge_document::ObjectData::Mesh(mesh) => mesh.clone(),
            meshbridge_document::ObjectData::Shape(shape) => shape.to_mesh(),
        };

        if mesh.is_empty() {
            warn!(source = %source, "Source object carries no surface to export");
            return Err(PipelineError::InvalidMeshObject {
                name: source.to_string(),
            });
        }

        mesh.write_stl(input_path)?;
        info!(
            source = %source,
            path = %input_path.display(),
            triangles = mesh.triangle_count(),
            "Exported source object"
        );
        Ok(())
    }
}

/// Advance the stage marker, logging the transition.
fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}
