//! Action classification targets.
//!
//! Maps action names to the fixed index the domain's canonical action order
//! assigns them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::error::{ConfigurationError, FeaturizeError};
use super::item::{Setup, TargetItemFeaturizer};
use crate::domain::{Domain, UnknownActionError};
use crate::nlu::Interpreter;
use crate::state::StateFeaturizer;

/// Maps actions to label ids.
#[derive(Debug, Clone, Default)]
pub struct ActionIndexer {
    state: Setup<HashMap<String, usize>>,
}

impl ActionIndexer {
    pub fn new() -> Self {
        ActionIndexer::default()
    }

    /// Returns the domain's index for `action`.
    pub fn convert(action: &str, domain: &Domain) -> Result<usize, UnknownActionError> {
        domain.lookup_action(action)
    }

    /// Converts a sequence of actions, failing on the first unknown one.
    pub fn convert_all<'a, I>(actions: I, domain: &Domain) -> Result<Vec<usize>, UnknownActionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        actions
            .into_iter()
            .map(|a| Self::convert(a, domain))
            .collect()
    }

    /// Number of actions known after setup.
    pub fn num_actions(&self) -> usize {
        self.state.configured().map_or(0, HashMap::len)
    }
}

impl TargetItemFeaturizer for ActionIndexer {
    type Item = str;
    type Output = usize;

    const NAME: &'static str = "ActionIndexer";

    fn setup(
        &mut self,
        domain: &Domain,
        _state_featurizer: &Arc<dyn StateFeaturizer>,
    ) -> Result<(), ConfigurationError> {
        self.raise_if_ready()?;
        let mut index = HashMap::with_capacity(domain.num_actions());
        for (i, action) in domain.action_names_or_texts().enumerate() {
            index.entry(action.to_string()).or_insert(i);
        }
        debug!(num_actions = index.len(), "action indexer set up");
        self.state = Setup::Configured(index);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.num_actions() > 0
    }

    fn featurize(
        &self,
        action: &str,
        _interpreter: Option<&dyn Interpreter>,
    ) -> Result<usize, FeaturizeError> {
        self.raise_if_not_ready()?;
        self.state
            .configured()
            .and_then(|index| index.get(action).copied())
            .ok_or_else(|| UnknownActionError(action.to_string()).into())
    }
}
