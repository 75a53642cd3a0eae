//! Error types, one enum per concern.

use thiserror::Error;

/// Errors surfaced by the risk serving path.
#[derive(Debug, Error)]
pub enum RiskError {
    /// The model artifact could not be loaded at startup. Fatal for serving.
    #[error("risk model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single request carried a non-numeric or negative field.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors reading or writing a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("feature layout mismatch: artifact has {found:?}, serving expects {expected:?}")]
    FeatureMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("class layout mismatch: artifact has {found:?}")]
    ClassMismatch { found: Vec<String> },

    #[error("artifact checksum mismatch")]
    ChecksumMismatch,

    #[error("malformed forest: {0}")]
    Malformed(String),

    #[error("cannot fit a forest on an empty training set")]
    EmptyTrainingSet,

    #[error("invalid forest config: {0}")]
    InvalidConfig(String),
}

/// Errors building a labeled dataset or fitting the classifier.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("dataset io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: column `{column}` has invalid value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors from a daily-entry record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
}
