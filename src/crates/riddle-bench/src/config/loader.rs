//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.riddle-bench/riddle-bench.toml
//! 3. Project-level config: ./riddle-bench.toml
//!
//! Later files override earlier ones key by key. An explicit path replaces
//! both file locations and must exist.

use crate::config::schema::BenchConfig;
use crate::error::{BenchError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name used at both locations.
pub const CONFIG_FILE_NAME: &str = "riddle-bench.toml";

/// Configuration loader that handles user, project and explicit configs
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit: bool,
}

impl ConfigLoader {
    /// Create a loader for the default locations
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir()
                .map(|home| home.join(".riddle-bench").join(CONFIG_FILE_NAME)),
            project_config_path: PathBuf::from(CONFIG_FILE_NAME),
            explicit: false,
        }
    }

    /// Load only `path`; it must exist
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: None,
            project_config_path: path.into(),
            explicit: true,
        }
    }

    /// Override both locations (used by tests and embedding callers)
    pub fn with_paths(user: Option<PathBuf>, project: PathBuf) -> Self {
        Self {
            user_config_path: user,
            project_config_path: project,
            explicit: false,
        }
    }

    /// Load configuration, layering files over defaults
    pub async fn load(&self) -> Result<BenchConfig> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(user_path) = &self.user_config_path {
            match Self::read_layer(user_path).await? {
                Some(layer) => {
                    debug!(path = %user_path.display(), "Loaded user-level config");
                    merge_values(&mut merged, layer);
                }
                None => debug!(path = %user_path.display(), "User-level config not found"),
            }
        }

        match Self::read_layer(&self.project_config_path).await? {
            Some(layer) => {
                debug!(path = %self.project_config_path.display(), "Loaded project-level config");
                merge_values(&mut merged, layer);
            }
            None if self.explicit => {
                return Err(BenchError::Fatal(format!(
                    "Config file not found: {}",
                    self.project_config_path.display()
                )));
            }
            None => debug!(path = %self.project_config_path.display(), "Project-level config not found"),
        }

        let mut config: BenchConfig = merged
            .try_into()
            .map_err(|e| BenchError::Fatal(format!("Invalid configuration: {}", e)))?;

        config.resolve_env_vars();

        info!("Configuration loaded");
        Ok(config)
    }

    /// Parse one file; `Ok(None)` only when it does not exist
    async fn read_layer(path: &Path) -> Result<Option<toml::Value>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BenchError::Fatal(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let value: toml::Value = toml::from_str(&content).map_err(|e| {
            BenchError::Fatal(format!("Failed to parse config {}: {}", path.display(), e))
        })?;

        Ok(Some(value))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`: tables merge per key, anything else replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
