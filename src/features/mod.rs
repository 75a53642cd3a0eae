//! Feature engineering shared by training and serving.
//!
//! Both paths build model input through [`FeatureVector::from_record`], so the
//! column order in [`FEATURE_NAMES`] is the only layout the model ever sees.

mod labeling;
mod usage;

pub use labeling::{heuristic_label, heuristic_score, label_records, LabeledDataset};
pub use usage::{EngineeredFeatures, UsageRecord};

use serde::{Deserialize, Serialize};

/// Model input columns, in order. Persisted with every artifact and checked at load.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["total_social", "night_usage", "social_vs_study", "red_days"];

pub const N_FEATURES: usize = 4;

/// Fixed-order model input for one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; N_FEATURES],
}

impl FeatureVector {
    pub fn from_record(record: &UsageRecord) -> Self {
        let eng = record.engineered();
        Self {
            values: [
                eng.total_social as f64,
                f64::from(record.night_usage),
                eng.social_vs_study,
                f64::from(record.red_days),
            ],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
