//! Errors raised by target featurizers.

use crate::domain::UnknownActionError;
use crate::nlu::TokenizationError;

/// A featurizer was used in the wrong lifecycle state or configured with
/// unusable inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("expected {0} to have been set up with `setup()`")]
    NotReady(&'static str),

    #[error("expected {0} not to have been set up before")]
    AlreadyConfigured(&'static str),

    #[error("entity '{0}' collides with the reserved no-entity tag")]
    ReservedEntityName(String),

    #[error("{0} has no interpreter: none was supplied and the state featurizer has no default")]
    MissingInterpreter(&'static str),
}

/// Any failure while featurizing a single training example.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeaturizeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnknownAction(#[from] UnknownActionError),

    #[error(transparent)]
    Tokenization(#[from] TokenizationError),
}
