//! Subscriber setup plus one-off JSON lines (ndjson) for reports that should not
//! depend on the active log level.

use crate::config::LogConfig;
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
pub struct LogEvent<'a, T: Serialize> {
    pub ts: String,
    pub level: &'a str,
    pub target: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a T>,
}

impl<'a, T: Serialize> LogEvent<'a, T> {
    pub fn new(level: &'a str, target: &'a str, message: &'a str, payload: Option<&'a T>) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            level,
            target,
            message,
            payload,
        }
    }

    pub fn info(target: &'a str, message: &'a str, payload: &'a T) -> Self {
        Self::new("INFO", target, message, Some(payload))
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber. `RUST_LOG` wins over `config.level`.
    /// Output goes to stderr; stdout is left for reports and `emit_json`.
    pub fn init(config: &LogConfig) -> Result<(), TryInitError> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
        let registry = tracing_subscriber::registry().with(filter);
        if config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::NONE)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        }
    }

    /// Write `event` as a single JSON line.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Report {
        rows: usize,
    }

    #[test]
    fn test_emit_json_one_line() {
        let report = Report { rows: 3 };
        let mut out = Vec::new();
        StructuredLogger::emit_json(&LogEvent::info("train", "done", &report), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["payload"]["rows"], 3);
    }

    #[test]
    fn test_payload_omitted_when_absent() {
        let event: LogEvent<'_, Report> = LogEvent::new("WARN", "server", "no payload", None);
        let mut out = Vec::new();
        StructuredLogger::emit_json(&event, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("payload").is_none());
        assert_eq!(value["message"], "no payload");
        assert_eq!(value["level"], "WARN");
    }
}
