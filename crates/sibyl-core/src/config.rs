//! Model manifest configuration.
//!
//! A manifest names the script files a problem instance is assembled from,
//! so a host application can drive `Registry::read_files` without hardcoding
//! paths.
//!
//! # Examples
//!
//! ```
//! use sibyl_core::ModelConfig;
//!
//! let config = ModelConfig::from_toml_str(r#"
//!     scripts = ["domain.sbl", "problem.sbl"]
//! "#).unwrap();
//! assert_eq!(config.scripts.len(), 2);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A model manifest: the ordered list of script files to ingest.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Script files, ingested in this order.
    #[serde(default)]
    pub scripts: Vec<PathBuf>,
}

impl ModelConfig {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a manifest from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a manifest from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
