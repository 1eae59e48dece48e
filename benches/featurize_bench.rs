use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use dialogue_targets::nlu::{EntityAnnotation, EntityData, WhitespaceInterpreter};
use dialogue_targets::state::{SingleStateFeaturizer, StateFeaturizer};
use dialogue_targets::{
    Domain, EntityTagFeaturizer, EntityTagSpec, Target, TargetFeaturizerConfig,
    TargetItemFeaturizer, TargetsFeaturizer,
};

fn domain() -> Domain {
    let entities: Vec<String> = (0..50).map(|i| format!("entity_{:02}", i)).collect();
    Domain::new(["greet", "inform", "affirm", "deny"], ["utter_text"], entities)
}

fn sample() -> EntityData {
    EntityData::new(
        "book a table for four people in new york city at seven tonight",
        vec![
            EntityAnnotation::new(17, 21, "four", "entity_03"),
            EntityAnnotation::new(32, 45, "new york city", "entity_07"),
            EntityAnnotation::new(49, 54, "seven", "entity_11"),
        ],
    )
}

fn bench_tag_spec(c: &mut Criterion) {
    let domain = domain();
    let entities = domain.entity_states();
    c.bench_function("tag_spec_50_entities_bilou", |b| {
        b.iter(|| EntityTagSpec::from_entities(black_box(&entities), true))
    });
}

fn bench_entity_featurize(c: &mut Criterion) {
    let domain = domain();
    let sf: Arc<dyn StateFeaturizer> = Arc::new(SingleStateFeaturizer::for_domain(&domain));
    let interpreter = WhitespaceInterpreter::new();
    let data = sample();

    for bilou in [false, true] {
        let mut featurizer = EntityTagFeaturizer::new(bilou);
        featurizer.setup(&domain, &sf).unwrap();
        let name = if bilou {
            "entity_featurize_bilou"
        } else {
            "entity_featurize_plain"
        };
        c.bench_function(name, |b| {
            b.iter(|| featurizer.featurize(black_box(&data), Some(&interpreter)))
        });
    }
}

fn bench_batch(c: &mut Criterion) {
    let domain = domain();
    let sf: Arc<dyn StateFeaturizer> = Arc::new(SingleStateFeaturizer::for_domain(&domain));
    let interpreter = WhitespaceInterpreter::new();
    let targets: Vec<Target> = (0..512)
        .map(|i| {
            let action = if i % 3 == 0 { "utter_text" } else { "inform" };
            Target::action(action).with_entities(sample())
        })
        .collect();

    let mut featurizer = TargetsFeaturizer::from_config(&TargetFeaturizerConfig::default());
    featurizer.setup(&domain, &sf).unwrap();

    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    group.bench_function("featurize_batch_512", |b| {
        b.iter(|| featurizer.featurize_batch(black_box(&targets), Some(&interpreter)))
    });
    group.finish();
}

criterion_group!(benches, bench_tag_spec, bench_entity_featurize, bench_batch);
criterion_main!(benches);
