//! Domain snapshot consumed by the target featurizers.
//!
//! Holds the action vocabulary (symbolic action names followed by free-text
//! actions), the entity vocabulary with optional roles and groups, and the
//! action-to-index lookup that defines classification targets.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

/// Separator between an entity name and its role or group in entity states.
pub const ENTITY_LABEL_SEPARATOR: char = '#';

/// Raised when an action is not part of the domain's action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}': not part of the domain's action vocabulary")]
pub struct UnknownActionError(pub String);

/// Read-only snapshot of a dialogue domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Domain {
    /// Symbolic action names, in canonical order.
    #[serde(default)]
    pub action_names: Vec<String>,
    /// Free-text actions (bot utterances given verbatim), in canonical order.
    #[serde(default)]
    pub action_texts: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    /// Roles per entity name.
    #[serde(default)]
    pub roles: HashMap<String, Vec<String>>,
    /// Groups per entity name.
    #[serde(default)]
    pub groups: HashMap<String, Vec<String>>,
}

impl Domain {
    /// Creates a domain from its action and entity vocabularies.
    pub fn new<A, T, E>(action_names: A, action_texts: T, entities: E) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Domain {
            action_names: action_names.into_iter().map(Into::into).collect(),
            action_texts: action_texts.into_iter().map(Into::into).collect(),
            entities: entities.into_iter().map(Into::into).collect(),
            ..Domain::default()
        }
    }

    /// Adds roles for an entity.
    pub fn with_roles(mut self, entity: &str, roles: &[&str]) -> Self {
        self.roles
            .entry(entity.to_string())
            .or_default()
            .extend(roles.iter().map(|r| r.to_string()));
        self
    }

    /// Adds groups for an entity.
    pub fn with_groups(mut self, entity: &str, groups: &[&str]) -> Self {
        self.groups
            .entry(entity.to_string())
            .or_default()
            .extend(groups.iter().map(|g| g.to_string()));
        self
    }

    /// Parses a domain from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a domain from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Canonical action vocabulary: action names followed by action texts.
    pub fn action_names_or_texts(&self) -> impl Iterator<Item = &str> {
        self.action_names
            .iter()
            .chain(self.action_texts.iter())
            .map(String::as_str)
    }

    /// Number of actions in the canonical vocabulary.
    pub fn num_actions(&self) -> usize {
        self.action_names.len() + self.action_texts.len()
    }

    /// Returns the fixed classification index of an action, if known.
    ///
    /// When an action appears both as a name and a text, the first
    /// occurrence wins.
    pub fn index_for_action(&self, action: &str) -> Option<usize> {
        self.action_names_or_texts().position(|a| a == action)
    }

    /// Like [`Domain::index_for_action`] but fails for unknown actions.
    pub fn lookup_action(&self, action: &str) -> Result<usize, UnknownActionError> {
        self.index_for_action(action)
            .ok_or_else(|| UnknownActionError(action.to_string()))
    }

    /// Returns true if the action is a free-text action.
    pub fn is_action_text(&self, action: &str) -> bool {
        self.action_texts.iter().any(|t| t == action)
    }

    /// Entity names plus every `entity#role` and `entity#group` combination.
    ///
    /// Returned sorted and deduplicated.
    pub fn entity_states(&self) -> Vec<String> {
        let mut states: BTreeSet<String> = self.entities.iter().cloned().collect();
        for labels in [&self.roles, &self.groups] {
            for (entity, values) in labels {
                for value in values {
                    states.insert(format!("{entity}{ENTITY_LABEL_SEPARATOR}{value}"));
                }
            }
        }
        states.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Domain {
        Domain::new(
            ["greet", "inform"],
            ["utter_text"],
            ["date", "city"],
        )
    }

    #[test]
    fn action_indices_follow_canonical_order() {
        let domain = sample();
        assert_eq!(domain.index_for_action("greet"), Some(0));
        assert_eq!(domain.index_for_action("inform"), Some(1));
        assert_eq!(domain.index_for_action("utter_text"), Some(2));
        assert_eq!(domain.index_for_action("nope"), None);
        assert_eq!(domain.num_actions(), 3);
    }

    #[test]
    fn lookup_unknown_action_fails() {
        let err = sample().lookup_action("unknown_action").unwrap_err();
        assert_eq!(err, UnknownActionError("unknown_action".to_string()));
    }

    #[test]
    fn entity_states_are_sorted_with_roles_and_groups() {
        let domain = sample()
            .with_roles("city", &["from", "to"])
            .with_groups("date", &["1"]);
        assert_eq!(
            domain.entity_states(),
            vec!["city", "city#from", "city#to", "date", "date#1"]
        );
    }

    #[test]
    fn parses_from_json() {
        let json = r#"{
            "action_names": ["greet", "inform"],
            "action_texts": ["Hi there!"],
            "entities": ["city"],
            "roles": {"city": ["from"]}
        }"#;
        let domain = Domain::from_json_str(json).unwrap();
        assert_eq!(domain.index_for_action("Hi there!"), Some(2));
        assert!(domain.is_action_text("Hi there!"));
        assert!(!domain.is_action_text("greet"));
        assert_eq!(domain.entity_states(), vec!["city", "city#from"]);
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            Domain::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
