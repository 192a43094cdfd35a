//! Application configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! { "schema_dir": "./schemas", "logging": { "level": "debug", "format": "json" } }
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::LoggingConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "modelgate.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory of `*.json` schema files loaded on top of the catalog
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), otherwise the default
    /// file if present, otherwise built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> CliResult<()> {
        if let Some(dir) = &self.schema_dir {
            if dir.as_os_str().is_empty() {
                return Err(CliError::config_error("schema_dir must not be empty"));
            }
        }

        self.logging.validate().map_err(CliError::config_error)?;

        Ok(())
    }
}
