//! The `doctor` command: report whether the external tool setup is usable.

use std::path::{Path, PathBuf};

use clap::Args;

use meshbridge_pipeline::request::SOLIDIFY_SCRIPT;

/// Arguments for the doctor command
#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Path to the Blender executable (overrides config and PATH lookup)
    #[arg(long)]
    pub blender: Option<PathBuf>,
}

/// Execute the doctor command
pub async fn execute(args: &DoctorArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(blender) = &args.blender {
        config.blender_path = blender.clone();
    }

    let mut healthy = true;

    match config.resolve_executable() {
        Ok(path) => println!("external tool: {} (ok)", path.display()),
        Err(e) => {
            println!("external tool: {} (NOT FOUND)", e);
            healthy = false;
        }
    }

    let script = config.script_path(SOLIDIFY_SCRIPT);
    if script.exists() {
        println!("transform script: {} (ok)", script.display());
    } else {
        println!("transform script: {} (MISSING)", script.display());
        healthy = false;
    }

    let temp_root = config.effective_temp_root();
    println!("temp root: {}", temp_root.display());

    if healthy {
        println!("doctor: all checks passed");
        Ok(())
    } else {
        anyhow::bail!("doctor: some checks failed")
    }
}
