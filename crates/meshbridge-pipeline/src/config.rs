//! Configuration for the conversion pipeline.
//!
//! Supports resolving the external executable from an explicit path with a
//! fallback scan over the `PATH` environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::PipelineError;

/// Default name of the external tool executable.
pub const DEFAULT_EXECUTABLE: &str = "blender";

/// Configuration for the Blender-backed solidify pipeline.
///
/// If `blender_path` is not explicitly set (or is empty), the pipeline
/// resolves the executable by scanning the directories on `PATH`.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path to the Blender executable.
    ///
    /// If empty, `PATH` resolution is attempted.
    #[serde(default)]
    pub blender_path: PathBuf,

    /// Directory containing the transform scripts passed to the tool.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,

    /// Root directory for per-run temporary artifacts.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Watchdog timeout in seconds for a single tool invocation.
    ///
    /// `0` disables the watchdog; the invocation then blocks until the tool
    /// exits on its own.
    #[serde(default)]
    #[validate(range(max = 7200))]
    pub timeout_seconds: u64,

    /// Whether to capture tool stdout/stderr for diagnostics.
    #[serde(default = "default_capture_output")]
    pub capture_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blender_path: PathBuf::new(), // Empty = resolve from PATH
            scripts_dir: default_scripts_dir(),
            temp_root: None,
            timeout_seconds: 0,
            capture_output: default_capture_output(),
        }
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_capture_output() -> bool {
    true
}

impl PipelineConfig {
    /// Resolve the effective temp root directory.
    pub fn effective_temp_root(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("meshbridge"))
    }

    /// The executable path the invoker will spawn.
    ///
    /// An explicitly configured path is used as-is (a missing binary then
    /// surfaces as `ToolNotFound` when the spawn fails); with no explicit
    /// path the directories on `PATH` are scanned, falling back to the bare
    /// default name.
    pub fn executable(&self) -> PathBuf {
        if !self.blender_path.as_os_str().is_empty() {
            return self.blender_path.clone();
        }
        find_on_path(DEFAULT_EXECUTABLE).unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE))
    }

    /// Strictly resolve the executable, verifying it exists.
    ///
    /// Used by diagnostics; the pipeline itself spawns [`Self::executable`]
    /// and reports a failed spawn as `ToolNotFound`.
    pub fn resolve_executable(&self) -> Result<PathBuf, PipelineError> {
        if !self.blender_path.as_os_str().is_empty() {
            if self.blender_path.exists() {
                info!(
                    path = %self.blender_path.display(),
                    "Using explicitly configured executable"
                );
                return Ok(self.blender_path.clone());
            }
            warn!(
                configured_path = %self.blender_path.display(),
                "Configured executable does not exist"
            );
            return Err(PipelineError::ToolNotFound {
                path: self.blender_path.clone(),
            });
        }

        match find_on_path(DEFAULT_EXECUTABLE) {
            Some(path) => {
                info!(path = %path.display(), "Resolved executable from PATH");
                Ok(path)
            }
            None => Err(PipelineError::ToolNotFound {
                path: PathBuf::from(DEFAULT_EXECUTABLE),
            }),
        }
    }

    /// Path to a named transform script under the scripts directory.
    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(script)
    }
}

/// Scan the `PATH` environment for an executable with the given name.
fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.blender_path.as_os_str().is_empty());
        assert_eq!(config.scripts_dir, PathBuf::from("scripts"));
        assert_eq!(config.timeout_seconds, 0);
        assert!(config.capture_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_temp_root_default() {
        let config = PipelineConfig::default();
        assert!(config.effective_temp_root().ends_with("meshbridge"));
    }

    #[test]
    fn test_resolve_explicit_executable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join("blender");
        std::fs::write(&exe, "#!/bin/sh\n").expect("write");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))
                .expect("chmod");
        }

        let config = PipelineConfig {
            blender_path: exe.clone(),
            ..Default::default()
        };
        assert_eq!(config.resolve_executable().expect("resolve"), exe);
    }

    #[test]
    fn test_resolve_missing_explicit_executable_fails() {
        let config = PipelineConfig {
            blender_path: PathBuf::from("/nonexistent/blender-dir/blender"),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_executable(),
            Err(PipelineError::ToolNotFound { .. })
        ));
        // The lenient accessor hands the path through for the spawn to fail.
        assert_eq!(
            config.executable(),
            PathBuf::from("/nonexistent/blender-dir/blender")
        );
    }

    #[test]
    fn test_script_path_joins_scripts_dir() {
        let config = PipelineConfig {
            scripts_dir: PathBuf::from("/opt/meshbridge/scripts"),
            ..Default::default()
        };
        assert_eq!(
            config.script_path("solidify.py"),
            PathBuf::from("/opt/meshbridge/scripts/solidify.py")
        );
    }

    #[test]
    fn test_timeout_validation_range() {
        let config = PipelineConfig {
            timeout_seconds: 10_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_deserialization_defaults() {
        let config: PipelineConfig = toml::from_str("").expect("parse");
        assert!(config.blender_path.as_os_str().is_empty());
        assert_eq!(config.timeout_seconds, 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = PipelineConfig {
            blender_path: PathBuf::from("/usr/bin/blender"),
            timeout_seconds: 600,
            capture_output: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let deser: PipelineConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(deser.blender_path, PathBuf::from("/usr/bin/blender"));
        assert_eq!(deser.timeout_seconds, 600);
        assert!(!deser.capture_output);
    }
}
