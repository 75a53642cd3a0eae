//! Screen-usage tracking with a behavioral risk classifier.
//!
//! Modular structure:
//! - [`features`]: Usage records, engineered features, heuristic labels
//! - [`model`]: Random forest classifier and its checksummed artifact
//! - [`training`]: CSV ingestion, fitting, holdout evaluation
//! - [`risk`]: Risk classes, request validation, serving engine
//! - [`tracker`]: Daily GREEN/RED entries and streak counters
//! - [`storage`]: Append-only entry stores (memory, SQLite)
//! - [`server`]: Axum HTTP routes
//! - [`logging`]: Structured JSON logging

pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod server;
pub mod storage;
pub mod tracker;
pub mod training;

pub use config::AppConfig;
pub use features::{FeatureVector, UsageRecord, FEATURE_NAMES};
pub use logging::StructuredLogger;
pub use model::{ModelArtifact, RandomForest};
pub use risk::{RiskAssessment, RiskEngine, RiskLabel};
pub use storage::RecordStore;
pub use tracker::Tracker;
