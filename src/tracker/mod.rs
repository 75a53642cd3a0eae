//! Daily usage tracking: GREEN/RED classification, streak counters, dashboard summary.

mod streak;

pub use streak::StreakState;

use crate::error::{RiskError, StoreError};
use crate::risk::parse_minutes;
use crate::storage::RecordStore;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Green,
    Red,
}

impl EntryStatus {
    /// Days at or under the threshold are GREEN.
    pub fn classify(usage_minutes: u32, green_threshold_minutes: u32) -> Self {
        if usage_minutes <= green_threshold_minutes {
            EntryStatus::Green
        } else {
            EntryStatus::Red
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Green => "GREEN",
            EntryStatus::Red => "RED",
        }
    }
}

/// One logged day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub time: String,
    pub usage_minutes: u32,
    pub task: Option<String>,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_time: u64,
    pub average_time: f64,
    pub records: Vec<DailyEntry>,
    pub streak: u32,
    pub best: u32,
    pub green_days: u32,
    pub red_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEntryResponse {
    pub alert: EntryStatus,
}

/// `{usage, task?}` from a JSON body. `usage` is required.
pub fn parse_add_request(body: &Value) -> Result<(u32, Option<String>), RiskError> {
    let obj = body
        .as_object()
        .ok_or_else(|| RiskError::InvalidInput("request body must be a JSON object".into()))?;
    let usage = parse_minutes(obj.get("usage"), "usage")?
        .ok_or_else(|| RiskError::InvalidInput("`usage` is required".into()))?;
    let task = match obj.get("task") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };
    Ok((usage, task))
}

/// Appends entries to a [`RecordStore`] and keeps the streak counters in step.
pub struct Tracker {
    store: Arc<dyn RecordStore>,
    state: Mutex<StreakState>,
    green_threshold_minutes: u32,
}

impl Tracker {
    /// Build a tracker over `store`, rebuilding streak counters from entries already in it.
    pub fn new(store: Arc<dyn RecordStore>, green_threshold_minutes: u32) -> Result<Self, StoreError> {
        let existing = store.all()?;
        let state = StreakState::replay(existing.iter().map(|e| e.status));
        if !existing.is_empty() {
            tracing::info!(entries = existing.len(), streak = state.streak, "tracker state restored");
        }
        Ok(Self {
            store,
            state: Mutex::new(state),
            green_threshold_minutes,
        })
    }

    pub fn add_entry(
        &self,
        usage_minutes: u32,
        task: Option<String>,
        at: DateTime<Local>,
    ) -> Result<AddEntryResponse, StoreError> {
        let status = EntryStatus::classify(usage_minutes, self.green_threshold_minutes);
        let entry = DailyEntry {
            time: at.format(TIME_FORMAT).to_string(),
            usage_minutes,
            task,
            status,
        };

        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        self.store.append(&entry)?;
        *state = state.record(status);
        tracing::info!(usage_minutes, status = status.as_str(), streak = state.streak, "entry added");
        Ok(AddEntryResponse { alert: status })
    }

    pub fn state(&self) -> Result<StreakState, StoreError> {
        self.state.lock().map(|s| *s).map_err(|_| StoreError::Poisoned)
    }

    pub fn dashboard(&self) -> Result<Dashboard, StoreError> {
        let state = self.state()?;
        let records = self.store.all()?;
        let total_time: u64 = records.iter().map(|r| u64::from(r.usage_minutes)).sum();
        let average_time = if records.is_empty() {
            0.0
        } else {
            total_time as f64 / records.len() as f64
        };
        Ok(Dashboard {
            total_time,
            average_time,
            records,
            streak: state.streak,
            best: state.best_streak,
            green_days: state.green_days,
            red_days: state.red_days,
        })
    }
}
