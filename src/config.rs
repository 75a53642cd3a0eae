//! Service configuration. JSON file with per-section defaults, plus a few env overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener and frontend assets
    pub server: ServerConfig,
    /// Risk model artifact
    pub model: ModelConfig,
    /// Random forest hyperparameters for the training CLI
    pub training: TrainingConfig,
    /// Daily entry tracking
    pub tracker: TrackerConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory served at `/` (must contain index.html)
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the trained risk model artifact
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
    /// Fraction held out for evaluation; 0 trains on everything
    pub test_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// A day at or under this many minutes is GREEN
    pub green_threshold_minutes: u32,
    pub store: StoreKind,
    /// Used when `store` is `sqlite`
    pub sqlite_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            static_dir: PathBuf::from("frontend"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("risk_model.json"),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 16,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
            test_ratio: 0.2,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            green_threshold_minutes: 60,
            store: StoreKind::Memory,
            sqlite_path: PathBuf::from("entries.db"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Env var naming the config file
    pub const PATH_ENV: &'static str = "SCREENTIME_CONFIG_PATH";

    /// Load from JSON file if present, otherwise defaults. A present but malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Config path from `SCREENTIME_CONFIG_PATH`, falling back to `config.json`.
    pub fn default_path() -> PathBuf {
        std::env::var(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    }

    /// Apply `SCREENTIME_*` environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(p) = std::env::var("SCREENTIME_MODEL_PATH") {
            self.model.path = PathBuf::from(p);
        }
        if let Ok(addr) = std::env::var("SCREENTIME_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Ok(dir) = std::env::var("SCREENTIME_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        self
    }
}
