//! Message-level interpreters.
//!
//! An interpreter tokenizes the text attributes of a message and attaches
//! numeric features to them. The target featurizers only rely on the
//! [`Interpreter`] trait; [`WhitespaceInterpreter`] is a small
//! dependency-free implementation used as the default and in tests.

use std::collections::BTreeMap;

use tracing::trace;

use super::features::{FeatureKind, FeatureMatrix, Features, SparseMatrix};
use super::message::{Attribute, Message, Token};

/// Origin label of features produced by [`WhitespaceInterpreter`].
pub const WHITESPACE_ORIGIN: &str = "whitespace_bow";

/// Errors raised when an interpreter cannot process a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizationError {
    #[error("entity '{entity}' has invalid span [{start}, {end}) for text of length {len}")]
    InvalidSpan {
        entity: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("message has entities but no text")]
    MissingText,
}

/// Turns a message into a tokenized, featurized message.
pub trait Interpreter: Send + Sync {
    /// Returns `Ok(None)` when the message carries nothing to featurize.
    fn featurize_message(&self, message: Message) -> Result<Option<Message>, TokenizationError>;
}

/// Splits on whitespace; action names are additionally split on `_`.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceInterpreter {
    vocabulary: BTreeMap<String, usize>,
}

impl WhitespaceInterpreter {
    /// Creates an interpreter that tokenizes but attaches no features.
    pub fn new() -> Self {
        WhitespaceInterpreter::default()
    }

    /// Creates an interpreter that attaches bag-of-words features over the
    /// given vocabulary. Lookups are lowercase.
    pub fn with_vocabulary<I>(words: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut vocabulary = BTreeMap::new();
        for word in words {
            let next = vocabulary.len();
            vocabulary.entry(word.as_ref().to_lowercase()).or_insert(next);
        }
        WhitespaceInterpreter { vocabulary }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn features_for(&self, attribute: Attribute, tokens: &[Token]) -> Option<[Features; 2]> {
        if self.vocabulary.is_empty() || tokens.is_empty() {
            return None;
        }
        let width = self.vocabulary.len();
        let mut sequence = SparseMatrix::new((tokens.len(), width));
        let mut sentence = SparseMatrix::new((1, width));
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for (row, token) in tokens.iter().enumerate() {
            if let Some(&col) = self.vocabulary.get(&token.text.to_lowercase()) {
                sequence.set(row, col, 1.0);
                *counts.entry(col).or_default() += 1.0;
            }
        }
        for (col, count) in counts {
            sentence.set(0, col, count);
        }
        Some([
            Features::new(
                FeatureKind::Sequence,
                attribute,
                WHITESPACE_ORIGIN,
                FeatureMatrix::Sparse(sequence),
            ),
            Features::new(
                FeatureKind::Sentence,
                attribute,
                WHITESPACE_ORIGIN,
                FeatureMatrix::Sparse(sentence),
            ),
        ])
    }
}

/// Tokenizes `text`, splitting on whitespace and on `extra` separators.
pub fn tokenize(text: &str, extra: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (pos, c) in text.chars().enumerate() {
        if c.is_whitespace() || extra.contains(&c) {
            if !current.is_empty() {
                tokens.push(Token::new(std::mem::take(&mut current), start));
            }
        } else {
            if current.is_empty() {
                start = pos;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(Token::new(current, start));
    }
    tokens
}

fn validate_entities(message: &Message) -> Result<(), TokenizationError> {
    if message.entities().is_empty() {
        return Ok(());
    }
    let text = message.text(Attribute::Text).ok_or(TokenizationError::MissingText)?;
    let len = text.chars().count();
    for entity in message.entities() {
        if entity.start >= entity.end || entity.end > len {
            return Err(TokenizationError::InvalidSpan {
                entity: entity.entity.clone(),
                start: entity.start,
                end: entity.end,
                len,
            });
        }
    }
    Ok(())
}

impl Interpreter for WhitespaceInterpreter {
    fn featurize_message(&self, mut message: Message) -> Result<Option<Message>, TokenizationError> {
        validate_entities(&message)?;

        let attributes: Vec<Attribute> = message.attributes().collect();
        if attributes.is_empty() {
            return Ok(None);
        }

        for attribute in attributes {
            let text = message.text(attribute).unwrap_or_default();
            let separators: &[char] = match attribute {
                Attribute::ActionName => &['_'],
                _ => &[],
            };
            let tokens = tokenize(text, separators);
            trace!(%attribute, num_tokens = tokens.len(), "tokenized attribute");
            if let Some(features) = self.features_for(attribute, &tokens) {
                for f in features {
                    message.add_features(f);
                }
            }
            message.set_tokens(attribute, tokens);
        }
        Ok(Some(message))
    }
}
