//! Portable model artifact: a single JSON document carrying the feature layout,
//! class order, and the fitted forest behind a SHA-256 checksum.

use super::RandomForest;
use crate::error::ModelError;
use crate::features::{FEATURE_NAMES, N_FEATURES};
use crate::risk::RiskLabel;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    feature_names: Vec<String>,
    classes: Vec<String>,
    trained_at: String,
    n_samples: usize,
    checksum: String,
    forest: Box<RawValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub format_version: u32,
    pub trained_at: String,
    pub n_samples: usize,
    /// SHA-256 hex of the embedded forest JSON
    pub checksum: String,
}

/// Fitted forest plus the metadata persisted alongside it.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub forest: RandomForest,
    pub metadata: ArtifactMetadata,
}

fn checksum(forest_json: &str) -> String {
    hex::encode(Sha256::digest(forest_json.as_bytes()))
}

fn expected_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

fn expected_classes() -> Vec<String> {
    RiskLabel::ALL.iter().map(|l| l.as_str().to_string()).collect()
}

impl ModelArtifact {
    /// Wrap a freshly fitted forest, stamping it with the current time.
    pub fn new(forest: RandomForest, n_samples: usize) -> Result<Self, ModelError> {
        let forest_json = serde_json::to_string(&forest)?;
        Ok(Self {
            metadata: ArtifactMetadata {
                format_version: FORMAT_VERSION,
                trained_at: Utc::now().to_rfc3339(),
                n_samples,
                checksum: checksum(&forest_json),
            },
            forest,
        })
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        let forest_json = serde_json::to_string(&self.forest)?;
        let envelope = Envelope {
            format_version: FORMAT_VERSION,
            feature_names: expected_feature_names(),
            classes: expected_classes(),
            trained_at: self.metadata.trained_at.clone(),
            n_samples: self.metadata.n_samples,
            checksum: checksum(&forest_json),
            forest: RawValue::from_string(forest_json)?,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Parse and verify an artifact: version, feature layout, class order, checksum, tree structure.
    pub fn from_json(data: &str) -> Result<Self, ModelError> {
        let envelope: Envelope = serde_json::from_str(data)?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: envelope.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let expected = expected_feature_names();
        if envelope.feature_names != expected {
            return Err(ModelError::FeatureMismatch {
                found: envelope.feature_names,
                expected,
            });
        }
        if envelope.classes != expected_classes() {
            return Err(ModelError::ClassMismatch {
                found: envelope.classes,
            });
        }
        if checksum(envelope.forest.get()) != envelope.checksum {
            return Err(ModelError::ChecksumMismatch);
        }

        let forest: RandomForest = serde_json::from_str(envelope.forest.get())?;
        forest.validate(N_FEATURES, RiskLabel::COUNT)?;

        Ok(Self {
            forest,
            metadata: ArtifactMetadata {
                format_version: envelope.format_version,
                trained_at: envelope.trained_at,
                n_samples: envelope.n_samples,
                checksum: envelope.checksum,
            },
        })
    }

    /// Write to a sibling `.tmp` file, then rename over `path`.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = self.to_json()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        tracing::info!(
            path = %path.display(),
            checksum = %self.metadata.checksum,
            trees = self.forest.n_trees(),
            "model artifact saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
