//! Composite target featurizer.
//!
//! Bundles an optional action featurizer and an optional entity tag
//! featurizer behind one setup/featurize surface. Architectures trained on a
//! single target signal leave the other slot empty; an empty slot is never
//! featurized.
//!
//! `setup()` is the barrier: once it returns, the featurizer is read-only and
//! may be shared across worker threads by reference.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use super::action::ActionFeaturizer;
use super::entity::{EntityTagFeaturizer, EntityTagSpec};
use super::error::{ConfigurationError, FeaturizeError};
use super::item::TargetItemFeaturizer;
use crate::config::TargetFeaturizerConfig;
use crate::domain::Domain;
use crate::nlu::{EntityData, FeatureGroups, Interpreter};
use crate::state::StateFeaturizer;

/// The targets of one training example.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Target {
    /// The action the policy must predict.
    pub action: String,
    /// Text with entity annotations, if the example has user text.
    #[serde(default)]
    pub entity_data: Option<EntityData>,
}

impl Target {
    pub fn action(action: impl Into<String>) -> Self {
        Target {
            action: action.into(),
            entity_data: None,
        }
    }

    pub fn with_entities(mut self, entity_data: EntityData) -> Self {
        self.entity_data = Some(entity_data);
        self
    }
}

/// Features of one example's targets. `None` means no featurizer for that
/// signal was configured (or the example has no entity data).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetFeatures {
    pub action: Option<FeatureGroups>,
    pub entities: Option<FeatureGroups>,
}

#[derive(Clone)]
pub struct TargetsFeaturizer {
    action_featurizer: Option<ActionFeaturizer>,
    entity_featurizer: Option<EntityTagFeaturizer>,
    parallel_threshold: usize,
}

impl TargetsFeaturizer {
    pub fn new(
        action_featurizer: Option<ActionFeaturizer>,
        entity_featurizer: Option<EntityTagFeaturizer>,
    ) -> Self {
        TargetsFeaturizer {
            action_featurizer,
            entity_featurizer,
            parallel_threshold: TargetFeaturizerConfig::default().parallel_threshold,
        }
    }

    /// Builds unconfigured sub-featurizers as selected by the configuration.
    pub fn from_config(config: &TargetFeaturizerConfig) -> Self {
        TargetsFeaturizer {
            action_featurizer: config.featurize_actions.then(ActionFeaturizer::new),
            entity_featurizer: config
                .featurize_entities
                .then(|| EntityTagFeaturizer::new(config.bilou_tagging)),
            parallel_threshold: config.parallel_threshold,
        }
    }

    pub fn action_featurizer(&self) -> Option<&ActionFeaturizer> {
        self.action_featurizer.as_ref()
    }

    pub fn entity_featurizer(&self) -> Option<&EntityTagFeaturizer> {
        self.entity_featurizer.as_ref()
    }

    /// The entity tag table, once the entity featurizer is set up.
    pub fn entity_tag_spec(&self) -> Option<&EntityTagSpec> {
        self.entity_featurizer.as_ref()?.encoding_spec()
    }

    /// Sets up every present sub-featurizer.
    ///
    /// Either every slot is configured or none is: on error the composite is
    /// left as it was and may be set up again.
    pub fn setup(
        &mut self,
        domain: &Domain,
        state_featurizer: &Arc<dyn StateFeaturizer>,
    ) -> Result<(), ConfigurationError> {
        let mut action_featurizer = self.action_featurizer.clone();
        if let Some(f) = action_featurizer.as_mut() {
            f.setup(domain, state_featurizer)?;
        }
        let mut entity_featurizer = self.entity_featurizer.clone();
        if let Some(f) = entity_featurizer.as_mut() {
            f.setup(domain, state_featurizer)?;
        }
        self.action_featurizer = action_featurizer;
        self.entity_featurizer = entity_featurizer;
        debug!(
            actions = self.action_featurizer.is_some(),
            entities = self.entity_featurizer.is_some(),
            "targets featurizer set up"
        );
        Ok(())
    }

    /// True when every present sub-featurizer is ready.
    pub fn is_ready(&self) -> bool {
        self.action_featurizer.as_ref().map_or(true, |f| f.is_ready())
            && self.entity_featurizer.as_ref().map_or(true, |f| f.is_ready())
    }

    /// Fails with the first present sub-featurizer that is not ready.
    pub fn raise_if_not_ready(&self) -> Result<(), ConfigurationError> {
        if let Some(f) = &self.action_featurizer {
            f.raise_if_not_ready()?;
        }
        if let Some(f) = &self.entity_featurizer {
            f.raise_if_not_ready()?;
        }
        Ok(())
    }

    /// Featurizes an action, or returns `None` without an action featurizer.
    pub fn featurize_action(
        &self,
        action: &str,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<Option<FeatureGroups>, FeaturizeError> {
        let Some(featurizer) = &self.action_featurizer else {
            return Ok(None);
        };
        featurizer.raise_if_not_ready()?;
        featurizer.featurize(action, interpreter).map(Some)
    }

    /// Featurizes entity data, or returns `None` without an entity featurizer.
    pub fn featurize_entities(
        &self,
        entity_data: &EntityData,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<Option<FeatureGroups>, FeaturizeError> {
        let Some(featurizer) = &self.entity_featurizer else {
            return Ok(None);
        };
        featurizer.raise_if_not_ready()?;
        featurizer.featurize(entity_data, interpreter).map(Some)
    }

    /// Featurizes all targets of one example.
    pub fn featurize(
        &self,
        target: &Target,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<TargetFeatures, FeaturizeError> {
        let action = self.featurize_action(&target.action, interpreter)?;
        let entities = match &target.entity_data {
            Some(data) => self.featurize_entities(data, interpreter)?,
            None => None,
        };
        Ok(TargetFeatures { action, entities })
    }

    /// Featurizes a batch of examples, preserving order.
    ///
    /// Batches of at least `parallel_threshold` examples are spread over the
    /// rayon thread pool. The first failing example aborts the batch.
    pub fn featurize_batch(
        &self,
        targets: &[Target],
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<Vec<TargetFeatures>, FeaturizeError> {
        self.raise_if_not_ready()?;
        if targets.len() >= self.parallel_threshold.max(1) {
            debug!(batch = targets.len(), "featurizing targets in parallel");
            targets
                .par_iter()
                .map(|t| self.featurize(t, interpreter))
                .collect()
        } else {
            targets
                .iter()
                .map(|t| self.featurize(t, interpreter))
                .collect()
        }
    }
}
