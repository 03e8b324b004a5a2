//! The `solidify` command: run the conversion pipeline over one mesh file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use meshbridge_document::Document;
use meshbridge_geometry::Shape;
use meshbridge_pipeline::{ProcessingRequest, SolidifyPipeline};

/// Arguments for the solidify command
#[derive(Debug, Args)]
pub struct SolidifyArgs {
    /// Input surface mesh file (STL)
    pub input: PathBuf,

    /// Output file for the solidified result (STL)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Wall thickness applied by the solidify transform
    #[arg(short, long, default_value_t = 1.0)]
    pub thickness: f64,

    /// Apply a remesh pass before solidifying to avoid self-intersections
    #[arg(long)]
    pub remesh_before: bool,

    /// Path to the Blender executable (overrides config and PATH lookup)
    #[arg(long)]
    pub blender: Option<PathBuf>,

    /// Directory containing the transform scripts
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,

    /// Watchdog timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Execute the solidify command
pub async fn execute(args: &SolidifyArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(blender) = &args.blender {
        config.blender_path = blender.clone();
    }
    if let Some(scripts_dir) = &args.scripts_dir {
        config.scripts_dir = scripts_dir.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = timeout;
    }

    let pipeline = SolidifyPipeline::new(config)?;

    let mut doc = Document::new("MeshBridge");
    let source = doc
        .insert_mesh_file(&args.input)
        .with_context(|| format!("loading input mesh '{}'", args.input.display()))?;
    let target = doc.add_shape("Solidified", Shape::empty());

    let request = ProcessingRequest::solidify(&source, args.thickness, args.remesh_before);
    let report = pipeline.run(&mut doc, &request, &target).await?;

    let solid = doc
        .get(&target)
        .and_then(|o| o.shape())
        .context("target object lost after pipeline run")?;
    solid
        .to_mesh()
        .write_stl(&args.output)
        .with_context(|| format!("writing output '{}'", args.output.display()))?;

    println!(
        "Solidified '{}' -> '{}' (volume {:.3}, {} ms)",
        args.input.display(),
        args.output.display(),
        report.solid_volume,
        report.duration.as_millis()
    );
    Ok(())
}
