//! Heuristic risk labels: the only supervision the classifier is trained on.

use super::{FeatureVector, UsageRecord, N_FEATURES};
use crate::risk::RiskLabel;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hand-tuned linear score. Treat as ground truth; changing it changes what the model means.
pub fn heuristic_score(record: &UsageRecord) -> f64 {
    let eng = record.engineered();
    eng.total_social as f64 / 120.0
        + f64::from(record.night_usage) / 60.0
        + f64::from(record.red_days) * 0.5
        + eng.social_vs_study
}

pub fn heuristic_label(record: &UsageRecord) -> RiskLabel {
    RiskLabel::from_score(heuristic_score(record))
}

/// Feature matrix (n_samples x N_FEATURES) with one heuristic label per row.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub features: Array2<f64>,
    pub labels: Vec<RiskLabel>,
}

/// Engineer features and assign a heuristic label to every record.
pub fn label_records(records: &[UsageRecord]) -> LabeledDataset {
    let mut features = Array2::zeros((records.len(), N_FEATURES));
    let mut labels = Vec::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        let fv = FeatureVector::from_record(r);
        for (j, v) in fv.values.iter().enumerate() {
            features[[i, j]] = *v;
        }
        labels.push(heuristic_label(r));
    }
    LabeledDataset { features, labels }
}

impl LabeledDataset {
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows per label, indexed by class id.
    pub fn label_counts(&self) -> [usize; RiskLabel::COUNT] {
        let mut counts = [0usize; RiskLabel::COUNT];
        for l in &self.labels {
            counts[l.class_id()] += 1;
        }
        counts
    }

    pub fn subset(&self, indices: &[usize]) -> LabeledDataset {
        let mut features = Array2::zeros((indices.len(), N_FEATURES));
        for (row, &i) in indices.iter().enumerate() {
            features.row_mut(row).assign(&self.features.row(i));
        }
        LabeledDataset {
            features,
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Seeded shuffle split into (train, test).
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> (LabeledDataset, LabeledDataset) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..self.n_samples()).collect();
        indices.shuffle(&mut rng);

        let test_size = (test_ratio.clamp(0.0, 1.0) * self.n_samples() as f64) as usize;
        let (test, train) = indices.split_at(test_size);
        (self.subset(train), self.subset(test))
    }

    /// Row indices sampled with replacement.
    pub fn bootstrap_indices(&self, seed: u64) -> Vec<usize> {
        let n = self.n_samples();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}
