//! Offline training: label usage records, fit the forest, evaluate, and package the artifact.

mod dataset;

pub use dataset::{
    read_usage_csv, read_usage_csv_from, synthetic_records, write_usage_csv, write_usage_csv_to,
    USAGE_COLUMNS,
};

use crate::config::TrainingConfig;
use crate::error::{ModelError, TrainingError};
use crate::features::{label_records, LabeledDataset, UsageRecord, FEATURE_NAMES};
use crate::model::{ForestConfig, ModelArtifact, RandomForest};
use crate::risk::RiskLabel;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Accuracy and 3x3 confusion matrix (rows = heuristic label, cols = prediction).
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub n_samples: usize,
    pub accuracy: f64,
    pub confusion: [[usize; RiskLabel::COUNT]; RiskLabel::COUNT],
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub n_samples: usize,
    pub label_counts: BTreeMap<RiskLabel, usize>,
    pub holdout: Option<Evaluation>,
    pub oob_accuracy: Option<f64>,
    pub feature_importances: Vec<(String, f64)>,
    pub n_trees: usize,
    pub checksum: String,
    pub trained_at: String,
}

pub fn evaluate(forest: &RandomForest, data: &LabeledDataset) -> Evaluation {
    let mut confusion = [[0usize; RiskLabel::COUNT]; RiskLabel::COUNT];
    for (row, label) in data.features.rows().into_iter().zip(&data.labels) {
        let x = row.to_vec();
        confusion[label.class_id()][forest.predict_class(&x)] += 1;
    }
    let correct: usize = (0..RiskLabel::COUNT).map(|i| confusion[i][i]).sum();
    let accuracy = if data.is_empty() {
        0.0
    } else {
        correct as f64 / data.n_samples() as f64
    };
    Evaluation {
        n_samples: data.n_samples(),
        accuracy,
        confusion,
    }
}

/// Label, fit, and package. With `test_ratio > 0` a holdout forest is scored first;
/// the returned artifact is always fit on every record.
pub fn train(
    records: &[UsageRecord],
    config: &TrainingConfig,
) -> Result<(ModelArtifact, TrainingReport), TrainingError> {
    if !(0.0..1.0).contains(&config.test_ratio) {
        return Err(ModelError::InvalidConfig(format!(
            "test_ratio must be in [0, 1), got {}",
            config.test_ratio
        ))
        .into());
    }

    let data = label_records(records);
    if data.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    let counts = data.label_counts();
    info!(
        samples = data.n_samples(),
        low = counts[0],
        medium = counts[1],
        high = counts[2],
        "dataset labeled"
    );

    let forest_config = ForestConfig::from(config);

    let holdout = if config.test_ratio > 0.0 {
        let (train_set, test_set) = data.random_split(config.test_ratio, config.seed);
        if test_set.is_empty() || train_set.is_empty() {
            None
        } else {
            let forest = RandomForest::fit(&forest_config, &train_set)?;
            let eval = evaluate(&forest, &test_set);
            info!(
                train = train_set.n_samples(),
                test = test_set.n_samples(),
                accuracy = eval.accuracy,
                "holdout evaluation"
            );
            Some(eval)
        }
    } else {
        None
    };

    let forest = RandomForest::fit(&forest_config, &data)?;
    info!(trees = forest.n_trees(), oob = ?forest.oob_accuracy(), "forest fitted");

    let feature_importances = FEATURE_NAMES
        .iter()
        .zip(forest.feature_importances())
        .map(|(n, &i)| (n.to_string(), i))
        .collect();
    let oob_accuracy = forest.oob_accuracy();
    let n_trees = forest.n_trees();

    let artifact = ModelArtifact::new(forest, data.n_samples())?;
    let report = TrainingReport {
        n_samples: data.n_samples(),
        label_counts: RiskLabel::ALL.iter().map(|l| (*l, counts[l.class_id()])).collect(),
        holdout,
        oob_accuracy,
        feature_importances,
        n_trees,
        checksum: artifact.metadata.checksum.clone(),
        trained_at: artifact.metadata.trained_at.clone(),
    };
    Ok((artifact, report))
}
