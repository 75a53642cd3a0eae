//! Inference benchmark: usage record → forest vote → risk label.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use screentime_risk::config::TrainingConfig;
use screentime_risk::training::{synthetic_records, train};
use screentime_risk::{RiskEngine, UsageRecord};
use serde_json::json;

fn bench_engine() -> RiskEngine {
    let config = TrainingConfig {
        n_trees: 100,
        test_ratio: 0.0,
        ..Default::default()
    };
    let (artifact, _) = train(&synthetic_records(2000, 7), &config).unwrap();
    RiskEngine::from_artifact(artifact)
}

fn bench_predict(c: &mut Criterion) {
    let engine = bench_engine();
    let record = UsageRecord {
        instagram: 40,
        youtube: 30,
        whatsapp: 10,
        study: 20,
        night_usage: 45,
        red_days: 2,
    };

    c.bench_function("predict_record_100_trees", |b| {
        b.iter(|| engine.predict(black_box(&record)).unwrap())
    });
}

fn bench_predict_json(c: &mut Criterion) {
    let engine = bench_engine();
    let body = json!({
        "instagram": "40", "youtube": 30, "whatsapp": 10.0,
        "study": 20, "night_usage": 45, "red_days": 2
    });

    c.bench_function("predict_json_100_trees", |b| {
        b.iter(|| engine.predict_json(black_box(&body)).unwrap())
    });
}

criterion_group!(benches, bench_predict, bench_predict_json);
criterion_main!(benches);
