use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal risk class. Class ids are the model's integer outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub const COUNT: usize = 3;
    pub const ALL: [RiskLabel; Self::COUNT] = [RiskLabel::Low, RiskLabel::Medium, RiskLabel::High];

    /// Scores at or above this are MEDIUM.
    pub const MEDIUM_THRESHOLD: f64 = 1.5;
    /// Scores at or above this are HIGH.
    pub const HIGH_THRESHOLD: f64 = 3.0;

    pub fn from_score(score: f64) -> Self {
        if score < Self::MEDIUM_THRESHOLD {
            RiskLabel::Low
        } else if score < Self::HIGH_THRESHOLD {
            RiskLabel::Medium
        } else {
            RiskLabel::High
        }
    }

    pub fn class_id(self) -> usize {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::Medium => 1,
            RiskLabel::High => 2,
        }
    }

    pub fn from_class_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Low => "LOW",
            RiskLabel::Medium => "MEDIUM",
            RiskLabel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
