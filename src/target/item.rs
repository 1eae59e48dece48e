//! The contract shared by all target item featurizers.
//!
//! Every featurizer starts [`Setup::Unconfigured`] and moves to
//! [`Setup::Configured`] through exactly one successful `setup()` per
//! training run. Readiness is recomputed from the configured dependencies on
//! every call; a configured featurizer whose dependencies are unusable is not
//! ready.

use std::sync::Arc;

use super::error::{ConfigurationError, FeaturizeError};
use crate::domain::Domain;
use crate::nlu::Interpreter;
use crate::state::StateFeaturizer;

/// Lifecycle of a featurizer's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setup<T> {
    Unconfigured,
    Configured(T),
}

impl<T> Default for Setup<T> {
    fn default() -> Self {
        Setup::Unconfigured
    }
}

impl<T> Setup<T> {
    pub fn configured(&self) -> Option<&T> {
        match self {
            Setup::Configured(config) => Some(config),
            Setup::Unconfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Setup::Configured(_))
    }
}

/// Turns one symbolic target item into numeric features.
pub trait TargetItemFeaturizer {
    /// The symbolic item featurized per call.
    type Item: ?Sized;
    /// What a single `featurize()` call produces.
    type Output;

    /// Name used in error messages and logs.
    const NAME: &'static str;

    /// Captures what the featurizer needs from the domain and state
    /// featurizer. Fails if the featurizer is already ready.
    fn setup(
        &mut self,
        domain: &Domain,
        state_featurizer: &Arc<dyn StateFeaturizer>,
    ) -> Result<(), ConfigurationError>;

    fn is_ready(&self) -> bool;

    fn raise_if_not_ready(&self) -> Result<(), ConfigurationError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ConfigurationError::NotReady(Self::NAME))
        }
    }

    fn raise_if_ready(&self) -> Result<(), ConfigurationError> {
        if self.is_ready() {
            Err(ConfigurationError::AlreadyConfigured(Self::NAME))
        } else {
            Ok(())
        }
    }

    fn featurize(
        &self,
        item: &Self::Item,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<Self::Output, FeaturizeError>;
}
