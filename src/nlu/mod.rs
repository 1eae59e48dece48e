//! Natural-language side of featurization.
//!
//! Contains the message model exchanged with interpreters, the numeric
//! feature containers, and the BILOU tagging utilities used by the entity
//! tag featurizer.

pub mod bilou;
pub mod features;
pub mod interpreter;
pub mod message;

pub use bilou::{apply_bilou_schema, BILOU_PREFIXES, NO_ENTITY_TAG, NO_ENTITY_TAG_ID};
pub use features::{FeatureGroups, FeatureKind, FeatureMatrix, Features, SparseMatrix};
pub use interpreter::{Interpreter, TokenizationError, WhitespaceInterpreter};
pub use message::{Attribute, EntityAnnotation, EntityData, Message, Token};
