//! Conversation state featurization seam.
//!
//! The target featurizers do not encode states themselves: they describe an
//! item as a [`SubState`] and hand it to a [`StateFeaturizer`], which owns
//! the interpreter policy and the numeric encoding.

pub mod single;

pub use single::SingleStateFeaturizer;

use crate::nlu::{Attribute, FeatureGroups, Interpreter, TokenizationError};

/// Structured representation of one conversational item before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubState {
    /// A symbolic action label such as `utter_greet`.
    ActionName(String),
    /// A free-text bot utterance.
    ActionText(String),
}

impl SubState {
    /// Describes an action either by its text or by its symbolic name.
    pub fn from_action(action: &str, as_text: bool) -> Self {
        if as_text {
            SubState::ActionText(action.to_string())
        } else {
            SubState::ActionName(action.to_string())
        }
    }

    pub fn attribute(&self) -> Attribute {
        match self {
            SubState::ActionName(_) => Attribute::ActionName,
            SubState::ActionText(_) => Attribute::ActionText,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SubState::ActionName(v) | SubState::ActionText(v) => v,
        }
    }
}

/// Encodes sub-states into feature groups.
pub trait StateFeaturizer: Send + Sync {
    /// True once the featurizer has everything it needs to encode sub-states.
    fn is_ready(&self) -> bool;

    /// Returns the interpreter to use: the supplied one, or the featurizer's
    /// default when none is supplied. `None` means no interpreter is available.
    fn check_and_replace_interpreter_if_needed<'a>(
        &'a self,
        interpreter: Option<&'a dyn Interpreter>,
    ) -> Option<&'a dyn Interpreter>;

    /// Encodes a sub-state using the given interpreter.
    fn featurize_substate_via_interpreter(
        &self,
        sub_state: &SubState,
        interpreter: &dyn Interpreter,
    ) -> Result<FeatureGroups, TokenizationError>;
}
