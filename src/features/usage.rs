//! Raw per-user usage aggregates and the two derived features.

use serde::{Deserialize, Serialize};

/// Aggregated usage for one user: minutes per app, late-night minutes, RED day count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub instagram: u32,
    pub youtube: u32,
    pub whatsapp: u32,
    pub study: u32,
    pub night_usage: u32,
    pub red_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    pub total_social: u64,
    pub social_vs_study: f64,
}

impl UsageRecord {
    pub fn total_social(&self) -> u64 {
        u64::from(self.instagram) + u64::from(self.youtube) + u64::from(self.whatsapp)
    }

    /// Social minutes per study minute. The `+ 1` keeps study = 0 finite and must
    /// match whatever the model was trained with.
    pub fn social_vs_study(&self) -> f64 {
        self.total_social() as f64 / (f64::from(self.study) + 1.0)
    }

    pub fn engineered(&self) -> EngineeredFeatures {
        EngineeredFeatures {
            total_social: self.total_social(),
            social_vs_study: self.social_vs_study(),
        }
    }
}
