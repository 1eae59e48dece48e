//! Entity tag targets.
//!
//! Builds the tag-to-id table for the domain's entities and encodes the
//! entity spans of a text as one tag id per token.
//!
//! Id layout, shared by training and inference:
//!   0                    the no-entity tag
//!   i + 1                entity at sorted position i (plain tagging)
//!   i * 4 + j + 1        BILOU prefix j of entity i (BILOU tagging)

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::{ConfigurationError, FeaturizeError};
use super::item::{Setup, TargetItemFeaturizer};
use crate::domain::Domain;
use crate::nlu::bilou::{self, BILOU_PREFIXES, NO_ENTITY_TAG, NO_ENTITY_TAG_ID};
use crate::nlu::{Attribute, EntityData, FeatureGroups, Features, Interpreter, Message};
use crate::state::StateFeaturizer;

/// Feature-group key of entity tag ids.
pub const ENTITY_TAGS: &str = "entity_tags";

/// The message attribute the tags describe.
pub const ENTITY_ATTRIBUTE_TYPE: &str = "entity";

/// Tag vocabulary of one tagged attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTagSpec {
    pub tag_name: String,
    pub tags_to_ids: BTreeMap<String, usize>,
    pub ids_to_tags: BTreeMap<usize, String>,
    pub num_tags: usize,
}

impl EntityTagSpec {
    /// Builds the tag table for an entity vocabulary.
    ///
    /// Entities are sorted and deduplicated first so the same vocabulary
    /// always yields the same ids.
    pub fn from_entities<I>(entities: I, bilou_tagging: bool) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let entities: BTreeSet<String> = entities
            .into_iter()
            .map(|e| e.as_ref().to_string())
            .collect();
        if entities.contains(NO_ENTITY_TAG) {
            return Err(ConfigurationError::ReservedEntityName(
                NO_ENTITY_TAG.to_string(),
            ));
        }

        let mut tags_to_ids = BTreeMap::new();
        for (i, entity) in entities.iter().enumerate() {
            if bilou_tagging {
                for (j, prefix) in BILOU_PREFIXES.iter().enumerate() {
                    tags_to_ids.insert(
                        format!("{prefix}{entity}"),
                        i * BILOU_PREFIXES.len() + j + 1,
                    );
                }
            } else {
                tags_to_ids.insert(entity.clone(), i + 1);
            }
        }
        tags_to_ids.insert(NO_ENTITY_TAG.to_string(), NO_ENTITY_TAG_ID);

        let ids_to_tags = tags_to_ids
            .iter()
            .map(|(tag, &id)| (id, tag.clone()))
            .collect();
        let num_tags = tags_to_ids.len();

        Ok(EntityTagSpec {
            tag_name: ENTITY_ATTRIBUTE_TYPE.to_string(),
            tags_to_ids,
            ids_to_tags,
            num_tags,
        })
    }

    /// Id of a tag; tags outside the table map to the no-entity id.
    pub fn id_for_tag(&self, tag: &str) -> usize {
        match self.tags_to_ids.get(tag) {
            Some(&id) => id,
            None => {
                trace!(tag, "tag not in entity tag spec, using no-entity id");
                NO_ENTITY_TAG_ID
            }
        }
    }

    /// Tag of an id; unknown ids decode to the no-entity tag.
    pub fn tag_for_id(&self, id: usize) -> &str {
        self.ids_to_tags
            .get(&id)
            .map(String::as_str)
            .unwrap_or(NO_ENTITY_TAG)
    }

    /// Decodes predicted ids back into tags.
    pub fn decode(&self, ids: &[usize]) -> Vec<&str> {
        ids.iter().map(|&id| self.tag_for_id(id)).collect()
    }
}

/// Per-token tag ids for a tokenized message.
///
/// With BILOU tagging the message's BILOU tags are used (computed here if
/// they have not been applied yet); otherwise each token gets the name of
/// the entity covering it.
pub fn tag_ids(message: &Message, spec: &EntityTagSpec, bilou_tagging: bool) -> Vec<usize> {
    let tokens = message.tokens(Attribute::Text);
    let tags = if bilou_tagging {
        match message.bilou_tags() {
            Some(tags) => tags.to_vec(),
            None => bilou::bilou_tags_from_entities(tokens, message.entities()),
        }
    } else {
        bilou::entity_labels_from_entities(tokens, message.entities())
    };
    tags.iter().map(|tag| spec.id_for_tag(tag)).collect()
}

#[derive(Clone)]
pub struct EntityFeaturizerConfig {
    pub encoding_spec: EntityTagSpec,
    /// Used to resolve the interpreter when none is supplied.
    pub state_featurizer: Option<Arc<dyn StateFeaturizer>>,
}

/// Encodes entity spans as per-token tag ids.
#[derive(Clone)]
pub struct EntityTagFeaturizer {
    bilou_tagging: bool,
    state: Setup<EntityFeaturizerConfig>,
}

impl EntityTagFeaturizer {
    pub fn new(bilou_tagging: bool) -> Self {
        EntityTagFeaturizer {
            bilou_tagging,
            state: Setup::Unconfigured,
        }
    }

    /// Creates a featurizer from a tag table built elsewhere, e.g. at inference.
    pub fn with_spec(bilou_tagging: bool, encoding_spec: EntityTagSpec) -> Self {
        EntityTagFeaturizer {
            bilou_tagging,
            state: Setup::Configured(EntityFeaturizerConfig {
                encoding_spec,
                state_featurizer: None,
            }),
        }
    }

    pub fn bilou_tagging(&self) -> bool {
        self.bilou_tagging
    }

    pub fn encoding_spec(&self) -> Option<&EntityTagSpec> {
        self.state.configured().map(|c| &c.encoding_spec)
    }

    fn resolve_interpreter<'a>(
        &'a self,
        interpreter: Option<&'a dyn Interpreter>,
    ) -> Option<&'a dyn Interpreter> {
        match self.state.configured().and_then(|c| c.state_featurizer.as_ref()) {
            Some(sf) => sf.check_and_replace_interpreter_if_needed(interpreter),
            None => interpreter,
        }
    }
}

impl TargetItemFeaturizer for EntityTagFeaturizer {
    type Item = EntityData;
    type Output = FeatureGroups;

    const NAME: &'static str = "EntityTagFeaturizer";

    fn setup(
        &mut self,
        domain: &Domain,
        state_featurizer: &Arc<dyn StateFeaturizer>,
    ) -> Result<(), ConfigurationError> {
        self.raise_if_ready()?;
        let encoding_spec = EntityTagSpec::from_entities(domain.entity_states(), self.bilou_tagging)?;
        debug!(
            num_tags = encoding_spec.num_tags,
            bilou_tagging = self.bilou_tagging,
            "entity tag featurizer set up"
        );
        self.state = Setup::Configured(EntityFeaturizerConfig {
            encoding_spec,
            state_featurizer: Some(Arc::clone(state_featurizer)),
        });
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.is_configured()
    }

    fn featurize(
        &self,
        entity_data: &EntityData,
        interpreter: Option<&dyn Interpreter>,
    ) -> Result<FeatureGroups, FeaturizeError> {
        let spec = match self.encoding_spec() {
            Some(spec) if !entity_data.is_empty() && spec.num_tags >= 2 => spec,
            // Fewer than two classes cannot be classified.
            _ => {
                trace!("no trainable entity tags, skipping");
                return Ok(FeatureGroups::new());
            }
        };

        let interpreter = self
            .resolve_interpreter(interpreter)
            .ok_or(ConfigurationError::MissingInterpreter(Self::NAME))?;

        let message = interpreter.featurize_message(Message::from_entity_data(entity_data))?;
        let Some(mut message) = message else {
            return Ok(FeatureGroups::new());
        };
        if message.tokens(Attribute::Text).is_empty() {
            trace!("entity data produced no tokens, skipping");
            return Ok(FeatureGroups::new());
        }

        if self.bilou_tagging {
            bilou::apply_bilou_schema(&mut message);
        }

        let ids = tag_ids(&message, spec, self.bilou_tagging);
        let mut groups = FeatureGroups::new();
        groups.insert(ENTITY_TAGS.to_string(), vec![Features::from_tag_ids(&ids)]);
        Ok(groups)
    }
}
