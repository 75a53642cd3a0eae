//! Risk classes, request validation, and the serving-side engine.

mod engine;
mod label;
mod request;

pub use engine::{RiskAssessment, RiskEngine};
pub use label::RiskLabel;
pub use request::{parse_minutes, parse_usage_request};
