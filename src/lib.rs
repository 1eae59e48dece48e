//! Dialogue target featurization library.
//!
//! Converts the targets of dialogue-policy training examples (next action,
//! entity tags) into numeric features, alongside the domain, message and
//! state-featurizer types those featurizers consume.

pub mod config;
pub mod domain;
pub mod nlu;
pub mod state;
pub mod target;

pub use config::{load_config, load_config_from_str, ConfigError, TargetFeaturizerConfig};
pub use domain::{Domain, UnknownActionError};
pub use target::{
    ActionFeaturizer, ActionIndexer, ConfigurationError, EntityTagFeaturizer, EntityTagSpec,
    FeaturizeError, Target, TargetFeatures, TargetItemFeaturizer, TargetsFeaturizer,
};
