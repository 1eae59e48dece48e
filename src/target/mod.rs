//! Target featurization.
//!
//! Turns the symbolic targets of a training example (the next action, the
//! entity labels of the user text) into numeric features. Each target kind
//! has its own [`TargetItemFeaturizer`]; [`TargetsFeaturizer`] coordinates
//! the ones an architecture needs.

pub mod action;
pub mod composite;
pub mod entity;
pub mod error;
pub mod indexer;
pub mod item;

pub use action::ActionFeaturizer;
pub use composite::{Target, TargetFeatures, TargetsFeaturizer};
pub use entity::{EntityTagFeaturizer, EntityTagSpec, ENTITY_ATTRIBUTE_TYPE, ENTITY_TAGS};
pub use error::{ConfigurationError, FeaturizeError};
pub use indexer::ActionIndexer;
pub use item::{Setup, TargetItemFeaturizer};
