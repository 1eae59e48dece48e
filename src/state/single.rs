//! Single-state featurizer over interpreter features.
//!
//! Runs the interpreter over a message carrying the sub-state's attribute and
//! groups the resulting features under the attribute name. Symbolic action
//! names the interpreter leaves unfeaturized fall back to a one-hot sentence
//! vector over the domain's action vocabulary.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{StateFeaturizer, SubState};
use crate::domain::Domain;
use crate::nlu::{
    Attribute, FeatureGroups, FeatureKind, FeatureMatrix, Features, Interpreter, Message,
    SparseMatrix, TokenizationError,
};

/// Origin label of the one-hot action fallback features.
pub const ONE_HOT_ORIGIN: &str = "one_hot_action";

#[derive(Clone, Default)]
pub struct SingleStateFeaturizer {
    action_index: HashMap<String, usize>,
    num_actions: usize,
    default_interpreter: Option<Arc<dyn Interpreter>>,
}

impl SingleStateFeaturizer {
    /// Creates an unprepared featurizer.
    pub fn new() -> Self {
        SingleStateFeaturizer::default()
    }

    /// Creates a featurizer prepared for the given domain.
    pub fn for_domain(domain: &Domain) -> Self {
        let mut featurizer = SingleStateFeaturizer::new();
        featurizer.prepare_for_training(domain);
        featurizer
    }

    /// Sets the interpreter used when callers supply none.
    pub fn with_default_interpreter(mut self, interpreter: Arc<dyn Interpreter>) -> Self {
        self.default_interpreter = Some(interpreter);
        self
    }

    /// Captures the domain's action vocabulary.
    ///
    /// An action listed more than once keeps its first index, matching
    /// [`Domain::index_for_action`].
    pub fn prepare_for_training(&mut self, domain: &Domain) {
        let mut action_index = HashMap::new();
        for (i, action) in domain.action_names_or_texts().enumerate() {
            action_index.entry(action.to_string()).or_insert(i);
        }
        self.action_index = action_index;
        self.num_actions = domain.num_actions();
        debug!(num_actions = self.num_actions, "state featurizer prepared");
    }

    fn one_hot(&self, action: &str) -> Option<Features> {
        let &col = self.action_index.get(action)?;
        let mut matrix = SparseMatrix::new((1, self.num_actions));
        matrix.set(0, col, 1.0);
        Some(Features::new(
            FeatureKind::Sentence,
            Attribute::ActionName,
            ONE_HOT_ORIGIN,
            FeatureMatrix::Sparse(matrix),
        ))
    }
}

impl StateFeaturizer for SingleStateFeaturizer {
    fn is_ready(&self) -> bool {
        !self.action_index.is_empty()
    }

    fn check_and_replace_interpreter_if_needed<'a>(
        &'a self,
        interpreter: Option<&'a dyn Interpreter>,
    ) -> Option<&'a dyn Interpreter> {
        match interpreter {
            Some(i) => Some(i),
            None => self
                .default_interpreter
                .as_ref()
                .map(|i| i.as_ref() as &dyn Interpreter),
        }
    }

    fn featurize_substate_via_interpreter(
        &self,
        sub_state: &SubState,
        interpreter: &dyn Interpreter,
    ) -> Result<FeatureGroups, TokenizationError> {
        let attribute = sub_state.attribute();
        let message = Message::with_text(attribute, sub_state.value());
        let mut features = match interpreter.featurize_message(message)? {
            Some(m) => m.features_for(attribute),
            None => Vec::new(),
        };

        if features.is_empty() {
            if let SubState::ActionName(name) = sub_state {
                features.extend(self.one_hot(name));
            }
        }

        let mut groups = FeatureGroups::new();
        if !features.is_empty() {
            groups.insert(attribute.as_str().to_string(), features);
        }
        Ok(groups)
    }
}
