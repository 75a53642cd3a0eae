//! Online risk scoring: rebuilds the training feature vector from a request and asks the forest.

use super::request::parse_usage_request;
use super::RiskLabel;
use crate::error::RiskError;
use crate::features::{FeatureVector, UsageRecord};
use crate::model::{ArtifactMetadata, ModelArtifact, RandomForest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Serving response. Echoes the recomputed inputs next to the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: RiskLabel,
    pub total_social: u64,
    pub night_usage: u32,
    pub red_days: u32,
}

struct LoadedModel {
    forest: RandomForest,
    metadata: Option<ArtifactMetadata>,
}

/// Holds the read-only model for the life of the process. If the artifact failed to
/// load, every prediction returns [`RiskError::ModelUnavailable`].
#[derive(Clone)]
pub struct RiskEngine {
    model: Result<Arc<LoadedModel>, String>,
}

impl RiskEngine {
    /// Load the artifact at `path`. Failure is recorded, not returned; check [`Self::ensure_ready`].
    pub fn load(path: &Path) -> Self {
        match ModelArtifact::load(path) {
            Ok(artifact) => {
                tracing::info!(
                    path = %path.display(),
                    trees = artifact.forest.n_trees(),
                    trained_at = %artifact.metadata.trained_at,
                    "risk model loaded"
                );
                Self::from_artifact(artifact)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "risk model failed to load");
                Self::unavailable(format!("{}: {e}", path.display()))
            }
        }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            model: Ok(Arc::new(LoadedModel {
                forest: artifact.forest,
                metadata: Some(artifact.metadata),
            })),
        }
    }

    pub fn from_forest(forest: RandomForest) -> Self {
        Self {
            model: Ok(Arc::new(LoadedModel {
                forest,
                metadata: None,
            })),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: Err(reason.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ok()
    }

    pub fn ensure_ready(&self) -> Result<(), RiskError> {
        self.loaded().map(|_| ())
    }

    pub fn metadata(&self) -> Option<&ArtifactMetadata> {
        self.model.as_ref().ok().and_then(|m| m.metadata.as_ref())
    }

    fn loaded(&self) -> Result<&LoadedModel, RiskError> {
        self.model
            .as_deref()
            .map_err(|reason| RiskError::ModelUnavailable(reason.clone()))
    }

    pub fn predict(&self, record: &UsageRecord) -> Result<RiskAssessment, RiskError> {
        let model = self.loaded()?;
        let features = FeatureVector::from_record(record);
        let class = model.forest.predict_class(features.as_slice());
        let risk = RiskLabel::from_class_id(class).unwrap_or(RiskLabel::High);

        tracing::debug!(
            total_social = record.total_social(),
            social_vs_study = features.values[2],
            risk = %risk,
            "risk predicted"
        );

        Ok(RiskAssessment {
            risk,
            total_social: record.total_social(),
            night_usage: record.night_usage,
            red_days: record.red_days,
        })
    }

    /// Validate a raw JSON body and score it.
    pub fn predict_json(&self, body: &Value) -> Result<RiskAssessment, RiskError> {
        self.ensure_ready()?;
        let record = parse_usage_request(body)?;
        self.predict(&record)
    }
}
