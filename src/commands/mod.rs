//! CLI command definitions and dispatch.

pub mod doctor;
pub mod solidify;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use validator::Validate;

use meshbridge_pipeline::PipelineConfig;

/// Configuration file used when `--config` is not given and the file exists.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// MeshBridge: Blender-backed solid reconstruction for mesh documents
#[derive(Debug, Parser)]
#[command(name = "meshbridge", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solidify a surface mesh into a closed body
    Solidify(solidify::SolidifyArgs),
    /// Check that the external tool and scripts are reachable
    Doctor(doctor::DoctorArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Solidify(args) => solidify::execute(args, self.config.as_deref()).await,
            Commands::Doctor(args) => doctor::execute(args, self.config.as_deref()).await,
        }
    }
}

/// Helper: load and validate the pipeline configuration.
pub(crate) fn load_config(config_path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.exists().then(|| default.to_path_buf())
        }
    };

    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("parsing config file '{}'", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    config.validate().context("invalid configuration")?;
    Ok(config)
}
