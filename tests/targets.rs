//! End-to-end target featurization scenarios.
//!
//! Loads a domain and a featurizer configuration from JSON, runs the setup
//! barrier once, then featurizes training examples the way the training
//! pipeline does.

use std::sync::Arc;

use dialogue_targets::nlu::{
    EntityAnnotation, EntityData, Interpreter, WhitespaceInterpreter, NO_ENTITY_TAG,
};
use dialogue_targets::state::{SingleStateFeaturizer, StateFeaturizer};
use dialogue_targets::target::ENTITY_TAGS;
use dialogue_targets::{
    load_config_from_str, ActionIndexer, ConfigurationError, Domain, EntityTagFeaturizer,
    EntityTagSpec, FeaturizeError, Target, TargetItemFeaturizer, TargetsFeaturizer,
    UnknownActionError,
};

const DOMAIN_JSON: &str = r#"{
    "action_names": ["greet", "inform"],
    "action_texts": ["utter_text"],
    "entities": ["date", "city"]
}"#;

fn domain() -> Domain {
    Domain::from_json_str(DOMAIN_JSON).expect("domain JSON should parse")
}

/// Routes featurizer logs to the test output; later calls are no-ops.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn state_featurizer(domain: &Domain) -> Arc<dyn StateFeaturizer> {
    init_logging();
    let default: Arc<dyn Interpreter> = Arc::new(WhitespaceInterpreter::new());
    Arc::new(SingleStateFeaturizer::for_domain(domain).with_default_interpreter(default))
}

fn booking() -> EntityData {
    // "book a flight to new york for monday"
    EntityData::new(
        "book a flight to new york for monday",
        vec![
            EntityAnnotation::new(17, 25, "new york", "city"),
            EntityAnnotation::new(30, 36, "monday", "date"),
        ],
    )
}

#[test]
fn plain_tag_table_for_city_and_date() {
    let mut featurizer = EntityTagFeaturizer::new(false);
    let domain = domain();
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    let spec = featurizer.encoding_spec().unwrap();
    assert_eq!(spec.num_tags, 3);
    assert_eq!(spec.tags_to_ids.len(), 3);
    assert_eq!(spec.tags_to_ids["city"], 1);
    assert_eq!(spec.tags_to_ids["date"], 2);
    assert_eq!(spec.tags_to_ids[NO_ENTITY_TAG], 0);
}

#[test]
fn bilou_tag_table_for_city_and_date() {
    let mut featurizer = EntityTagFeaturizer::new(true);
    let domain = domain();
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    let spec = featurizer.encoding_spec().unwrap();
    let expected: Vec<(&str, usize)> = vec![
        ("B-city", 1),
        ("B-date", 5),
        ("I-city", 2),
        ("I-date", 6),
        ("L-city", 3),
        ("L-date", 7),
        ("U-city", 4),
        ("U-date", 8),
        (NO_ENTITY_TAG, 0),
    ];
    let actual: Vec<(&str, usize)> = spec
        .tags_to_ids
        .iter()
        .map(|(tag, &id)| (tag.as_str(), id))
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(spec.num_tags, 9);
}

#[test]
fn action_indices_and_unknown_action() {
    let domain = domain();
    assert_eq!(
        ActionIndexer::convert("greet", &domain),
        Ok(domain.index_for_action("greet").unwrap())
    );
    assert_eq!(ActionIndexer::convert("utter_text", &domain), Ok(2));
    assert_eq!(
        ActionIndexer::convert("unknown_action", &domain),
        Err(UnknownActionError("unknown_action".to_string()))
    );
}

#[test]
fn full_pipeline_from_config() {
    let config = load_config_from_str(r#"{"bilou_tagging": true}"#).unwrap();
    let domain = domain();
    let mut featurizer = TargetsFeaturizer::from_config(&config);
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    // No interpreter passed: the state featurizer's default is used.
    let target = Target::action("inform").with_entities(booking());
    let features = featurizer.featurize(&target, None).unwrap();

    let action = features.action.unwrap();
    assert_eq!(action.keys().collect::<Vec<_>>(), vec!["action_name"]);

    let entities = features.entities.unwrap();
    let ids = entities[ENTITY_TAGS][0].tag_ids().unwrap();
    // book a flight to new york for monday
    assert_eq!(ids, vec![0, 0, 0, 0, 1, 3, 0, 8]);

    let spec = featurizer.entity_tag_spec().unwrap();
    assert_eq!(
        spec.decode(&ids),
        vec![
            NO_ENTITY_TAG,
            NO_ENTITY_TAG,
            NO_ENTITY_TAG,
            NO_ENTITY_TAG,
            "B-city",
            "L-city",
            NO_ENTITY_TAG,
            "U-date"
        ]
    );
}

#[test]
fn entity_only_architecture_ignores_actions() {
    let domain = domain();
    let mut featurizer = TargetsFeaturizer::new(None, Some(EntityTagFeaturizer::new(false)));
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    let target = Target::action("action_that_does_not_exist").with_entities(booking());
    let features = featurizer.featurize(&target, None).unwrap();
    assert!(features.action.is_none());
    assert_eq!(
        features.entities.unwrap()[ENTITY_TAGS][0].tag_ids(),
        Some(vec![0, 0, 0, 0, 1, 1, 0, 2])
    );
}

#[test]
fn training_examples_from_json() {
    let targets: Vec<Target> = serde_json::from_str(
        r#"[
            {"action": "greet"},
            {"action": "inform", "entity_data": {
                "text": "to paris",
                "entities": [{"start": 3, "end": 8, "value": "paris", "entity": "city"}]
            }}
        ]"#,
    )
    .unwrap();

    let domain = domain();
    let config = load_config_from_str(r#"{"bilou_tagging": false}"#).unwrap();
    let mut featurizer = TargetsFeaturizer::from_config(&config);
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    let features = featurizer.featurize_batch(&targets, None).unwrap();
    assert_eq!(features.len(), 2);
    assert!(features[0].entities.is_none());
    assert_eq!(
        features[1].entities.as_ref().unwrap()[ENTITY_TAGS][0].tag_ids(),
        Some(vec![0, 1])
    );
}

#[test]
fn domain_with_sentinel_entity_is_rejected() {
    let domain = Domain::new(["greet"], ["hi"], ["city", NO_ENTITY_TAG]);
    let mut featurizer = TargetsFeaturizer::new(None, Some(EntityTagFeaturizer::new(true)));
    assert_eq!(
        featurizer.setup(&domain, &state_featurizer(&domain)),
        Err(ConfigurationError::ReservedEntityName(NO_ENTITY_TAG.to_string()))
    );
    assert!(!featurizer.is_ready());
}

#[test]
fn featurizer_template_is_reused_by_cloning() {
    let template = TargetsFeaturizer::new(None, Some(EntityTagFeaturizer::new(false)));

    let small = Domain::new(["greet"], ["hi"], ["city"]);
    let mut first = template.clone();
    first.setup(&small, &state_featurizer(&small)).unwrap();

    let large = domain();
    let mut second = template.clone();
    second.setup(&large, &state_featurizer(&large)).unwrap();

    assert_eq!(first.entity_tag_spec().unwrap().num_tags, 2);
    assert_eq!(second.entity_tag_spec().unwrap().num_tags, 3);
    assert!(template.entity_tag_spec().is_none());
}

#[test]
fn tag_spec_exported_for_inference() {
    let domain = domain();
    let mut training = EntityTagFeaturizer::new(true);
    training.setup(&domain, &state_featurizer(&domain)).unwrap();
    let json = serde_json::to_string(training.encoding_spec().unwrap()).unwrap();

    let spec: EntityTagSpec = serde_json::from_str(&json).unwrap();
    let inference = EntityTagFeaturizer::with_spec(true, spec);
    let interpreter = WhitespaceInterpreter::new();
    assert_eq!(
        training.featurize(&booking(), Some(&interpreter)),
        inference.featurize(&booking(), Some(&interpreter))
    );
}

#[test]
fn malformed_entity_data_fails_the_example() {
    let domain = domain();
    let mut featurizer = TargetsFeaturizer::new(None, Some(EntityTagFeaturizer::new(false)));
    featurizer.setup(&domain, &state_featurizer(&domain)).unwrap();

    let broken = EntityData::new("paris", vec![EntityAnnotation::new(0, 50, "paris", "city")]);
    let err = featurizer
        .featurize(&Target::action("greet").with_entities(broken), None)
        .unwrap_err();
    assert!(matches!(err, FeaturizeError::Tokenization(_)));
}
