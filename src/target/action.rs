//! Action targets encoded through the state featurizer.
//!
//! Free-text actions are described by their text, symbolic actions by their
//! name; the state featurizer turns that sub-state into feature groups.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::error::{ConfigurationError, FeaturizeError};
use super::item::{Setup, TargetItemFeaturizer};
use crate::domain::Domain;
use crate::nlu::{FeatureGroups, Interpreter};
use crate::state::{StateFeaturizer, SubState};

#[derive(Clone)]
pub struct ActionFeaturizerConfig {
    pub state_featurizer: Arc<dyn StateFeaturizer>,
    /// The domain's free-text actions.
    pub action_texts: BTreeSet<String>,
}

/// Featurizes the next action via the shared state featurizer.
#[derive(Clone, Default)]
pub struct ActionFeaturizer {
    state: Setup<ActionFeaturizerConfig>,
}

impl ActionFeaturizer {
    /// Creates an unconfigured featurizer.
    pub fn new() -> Self {
        ActionFeaturizer::default()
    }

    /// Creates a featurizer from dependencies known up front.
    pub fn with_dependencies<I>(state_featurizer: Arc<dyn StateFeaturizer>, action_texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        ActionFeaturizer {
            state: Setup::Configured(ActionFeaturizerConfig {
                state_featurizer,
                action_texts: action_texts.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn config(&self) -> Option<&ActionFeaturizerConfig> {
        self.state.configured()
    }

    fn ready_config(&self) -> Result<&ActionFeaturizerConfig, ConfigurationError> {
        self.raise_if_not_ready()?;
        self.state
            .configured()
            .ok_or(ConfigurationError::NotReady(Self::NAME))
    }
}

impl TargetItemFeaturizer for ActionFeaturizer {
    type Item = str;
    type Output = FeatureGroups;

    const NAME: &'static str = "ActionFeaturizer";

    fn setup(
        &mut self,
        domain: &Domain,
        state_featurizer: &Arc<dyn StateFeaturizer>,
    ) -> Result<(), ConfigurationError> {
        self.raise_if_ready()?;
        let action_texts: BTreeSet<String> = domain.action_texts.iter().cloned().collect();
        debug!(
            num_action_texts = action_texts.len(),
            state_featurizer_ready = state_featurizer.is_ready(),
            "action featurizer set up"
        );
        self.state = Setup::Configured(ActionFeaturizerConfig {
            state_featurizer: Arc::clone(state_featurizer),
            action_texts,
        });
        Ok(())
    }

    fn is_ready(&self) -> bool {
        match self.state.configured() {
            Some(config) => config.state_featurizer.is_ready() && !config.action_texts.is_empty(),
            None => false,
        }
    }

    fn featurize(
        &self,
        action: &str,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<FeatureGroups, FeaturizeError> {
        let config = self.ready_config()?;
        let interpreter = config
            .state_featurizer
            .check_and_replace_interpreter_if_needed(interpreter)
            .ok_or(ConfigurationError::MissingInterpreter(Self::NAME))?;

        let sub_state = SubState::from_action(action, config.action_texts.contains(action));
        Ok(config
            .state_featurizer
            .featurize_substate_via_interpreter(&sub_state, interpreter)?)
    }
}
