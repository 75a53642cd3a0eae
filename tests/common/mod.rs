use screentime_risk::config::TrainingConfig;
use screentime_risk::training::{synthetic_records, train};
use screentime_risk::{ModelArtifact, RiskEngine};
use std::sync::OnceLock;

#[allow(dead_code)]
pub fn small_training_config() -> TrainingConfig {
    TrainingConfig {
        n_trees: 25,
        max_depth: 12,
        test_ratio: 0.0,
        ..Default::default()
    }
}

/// Forest fit once per test binary on seeded synthetic data.
pub fn shared_artifact() -> ModelArtifact {
    static ARTIFACT: OnceLock<ModelArtifact> = OnceLock::new();
    ARTIFACT
        .get_or_init(|| {
            let records = synthetic_records(1500, 42);
            let (artifact, _) = train(&records, &small_training_config()).unwrap();
            artifact
        })
        .clone()
}

#[allow(dead_code)]
pub fn trained_engine() -> RiskEngine {
    RiskEngine::from_artifact(shared_artifact())
}
