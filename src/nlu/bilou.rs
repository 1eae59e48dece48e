//! BILOU boundary tagging.
//!
//! Tokens inside a multi-token entity span are tagged `B-` (first),
//! `I-` (middle) and `L-` (last); a span covering a single token is tagged
//! `U-`. Tokens outside every span carry [`NO_ENTITY_TAG`].
//!
//! The prefix order and the sentinel tag are part of the id layout shared
//! by training and inference and must not change.

use tracing::warn;

use super::message::{Attribute, EntityAnnotation, Message, Token};

/// Begin, Inside, Last, Unit, in id-assignment order.
pub const BILOU_PREFIXES: [&str; 4] = ["B-", "I-", "L-", "U-"];

/// Tag of tokens that are not part of any entity.
pub const NO_ENTITY_TAG: &str = "no entity";

/// Id reserved for [`NO_ENTITY_TAG`].
pub const NO_ENTITY_TAG_ID: usize = 0;

const BEGIN: usize = 0;
const INSIDE: usize = 1;
const LAST: usize = 2;
const UNIT: usize = 3;

/// Returns the BILOU prefix of a tag, if it has one.
pub fn bilou_prefix_from_tag(tag: &str) -> Option<&'static str> {
    BILOU_PREFIXES.iter().copied().find(|p| tag.starts_with(p))
}

/// Strips a BILOU prefix from a tag; tags without a prefix are returned as is.
pub fn tag_without_prefix(tag: &str) -> &str {
    match bilou_prefix_from_tag(tag) {
        Some(prefix) => &tag[prefix.len()..],
        None => tag,
    }
}

/// Indices of the tokens each entity covers, with entities that collide with
/// an earlier one (or cover no token) dropped.
fn assign_spans(tokens: &[Token], entities: &[EntityAnnotation]) -> Vec<(usize, Vec<usize>)> {
    let mut owner: Vec<Option<usize>> = vec![None; tokens.len()];
    let mut spans = Vec::with_capacity(entities.len());

    for (e_idx, entity) in entities.iter().enumerate() {
        let covered: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.overlaps(entity.start, entity.end))
            .map(|(i, _)| i)
            .collect();

        if covered.is_empty() {
            warn!(
                entity = %entity.entity,
                start = entity.start,
                end = entity.end,
                "entity span is not aligned with any token"
            );
            continue;
        }
        if let Some(&clash) = covered.iter().find(|&&i| owner[i].is_some()) {
            warn!(
                entity = %entity.entity,
                token = %tokens[clash].text,
                "token is part of overlapping entities, keeping the first"
            );
            continue;
        }
        for &i in &covered {
            owner[i] = Some(e_idx);
        }
        spans.push((e_idx, covered));
    }
    spans
}

/// Per-token BILOU tags for the given entity spans.
pub fn bilou_tags_from_entities(tokens: &[Token], entities: &[EntityAnnotation]) -> Vec<String> {
    let mut tags = vec![NO_ENTITY_TAG.to_string(); tokens.len()];

    for (e_idx, covered) in assign_spans(tokens, entities) {
        let name = &entities[e_idx].entity;
        let (first, last) = (covered[0], covered[covered.len() - 1]);
        for &i in &covered {
            let prefix = if first == last {
                UNIT
            } else if i == first {
                BEGIN
            } else if i == last {
                LAST
            } else {
                INSIDE
            };
            tags[i] = format!("{}{}", BILOU_PREFIXES[prefix], name);
        }
    }
    tags
}

/// Per-token entity names without boundary prefixes.
pub fn entity_labels_from_entities(tokens: &[Token], entities: &[EntityAnnotation]) -> Vec<String> {
    let mut labels = vec![NO_ENTITY_TAG.to_string(); tokens.len()];
    for (e_idx, covered) in assign_spans(tokens, entities) {
        for i in covered {
            labels[i] = entities[e_idx].entity.clone();
        }
    }
    labels
}

/// Computes BILOU tags for the message's text tokens and stores them on it.
pub fn apply_bilou_schema(message: &mut Message) {
    let tags = bilou_tags_from_entities(message.tokens(Attribute::Text), message.entities());
    message.set_bilou_tags(tags);
}
