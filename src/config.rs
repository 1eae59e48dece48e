//! Featurizer configuration.
//!
//! Settings are read from JSON; every field is optional and falls back to
//! the defaults used for training runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors raised while loading configuration or domain files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration of the composite target featurizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetFeaturizerConfig {
    /// Expand entity tags with Begin/Inside/Last/Unit prefixes.
    pub bilou_tagging: bool,
    /// Build an action featurizer.
    pub featurize_actions: bool,
    /// Build an entity tag featurizer.
    pub featurize_entities: bool,
    /// Minimum batch size before featurization fans out across threads.
    pub parallel_threshold: usize,
}

impl Default for TargetFeaturizerConfig {
    fn default() -> Self {
        TargetFeaturizerConfig {
            bilou_tagging: true,
            featurize_actions: true,
            featurize_entities: true,
            parallel_threshold: 64,
        }
    }
}

/// Loads featurizer configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<TargetFeaturizerConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&data)
}

/// Loads featurizer configuration from a JSON string.
pub fn load_config_from_str(json: &str) -> Result<TargetFeaturizerConfig, ConfigError> {
    Ok(serde_json::from_str(json)?)
}
