//! Message model shared with the interpreter.
//!
//! Offsets (token and entity spans) are character offsets into the text,
//! not byte offsets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::Features;

/// Message attributes that can carry text, tokens and features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Text,
    ActionName,
    ActionText,
}

impl Attribute {
    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::ActionName => "action_name",
            Attribute::ActionText => "action_text",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its character span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        Token { text, start, end }
    }

    /// True if the token shares at least one character with `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// A labelled entity span in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub value: String,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl EntityAnnotation {
    pub fn new(start: usize, end: usize, value: impl Into<String>, entity: impl Into<String>) -> Self {
        EntityAnnotation {
            start,
            end,
            value: value.into(),
            entity: entity.into(),
            role: None,
            group: None,
        }
    }
}

/// Text plus its entity annotations: the input to entity featurization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub entities: Vec<EntityAnnotation>,
}

impl EntityData {
    pub fn new(text: impl Into<String>, entities: Vec<EntityAnnotation>) -> Self {
        EntityData {
            text: text.into(),
            entities,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.entities.is_empty()
    }
}

/// A message flowing through the interpreter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    texts: BTreeMap<Attribute, String>,
    tokens: BTreeMap<Attribute, Vec<Token>>,
    features: Vec<Features>,
    entities: Vec<EntityAnnotation>,
    bilou_tags: Option<Vec<String>>,
}

impl Message {
    pub fn new() -> Self {
        Message::default()
    }

    pub fn from_entity_data(data: &EntityData) -> Self {
        let mut message = Message::new();
        message.set_text(Attribute::Text, data.text.clone());
        message.entities = data.entities.clone();
        message
    }

    pub fn with_text(attribute: Attribute, text: impl Into<String>) -> Self {
        let mut message = Message::new();
        message.set_text(attribute, text);
        message
    }

    pub fn text(&self, attribute: Attribute) -> Option<&str> {
        self.texts.get(&attribute).map(String::as_str)
    }

    pub fn set_text(&mut self, attribute: Attribute, text: impl Into<String>) {
        self.texts.insert(attribute, text.into());
    }

    /// Attributes that carry text, in a fixed order.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.texts.keys().copied()
    }

    pub fn tokens(&self, attribute: Attribute) -> &[Token] {
        self.tokens.get(&attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_tokens(&mut self, attribute: Attribute, tokens: Vec<Token>) {
        self.tokens.insert(attribute, tokens);
    }

    pub fn entities(&self) -> &[EntityAnnotation] {
        &self.entities
    }

    pub fn add_features(&mut self, features: Features) {
        self.features.push(features);
    }

    /// Features attached to one attribute, in insertion order.
    pub fn features_for(&self, attribute: Attribute) -> Vec<Features> {
        self.features
            .iter()
            .filter(|f| f.attribute == attribute)
            .cloned()
            .collect()
    }

    pub fn bilou_tags(&self) -> Option<&[String]> {
        self.bilou_tags.as_deref()
    }

    pub fn set_bilou_tags(&mut self, tags: Vec<String>) {
        self.bilou_tags = Some(tags);
    }
}
