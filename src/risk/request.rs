//! Risk request parsing. Every field is optional and defaults to 0; anything present
//! must be a non-negative number (JSON number or integer string). Fractional numbers
//! are truncated toward zero.

use crate::error::RiskError;
use crate::features::UsageRecord;
use serde_json::{Map, Value};

/// Coerce one request value to whole minutes. `None` and `null` mean absent.
pub fn parse_minutes(value: Option<&Value>, name: &str) -> Result<Option<u32>, RiskError> {
    let invalid = |why: &str| RiskError::InvalidInput(format!("`{name}` {why}"));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                u32::try_from(v).map(Some).map_err(|_| invalid("is too large"))
            } else if n.as_i64().is_some() {
                Err(invalid("must not be negative"))
            } else {
                match n.as_f64() {
                    Some(f) if f < 0.0 => Err(invalid("must not be negative")),
                    Some(f) if f.trunc() <= f64::from(u32::MAX) => Ok(Some(f.trunc() as u32)),
                    Some(_) => Err(invalid("is too large")),
                    None => Err(invalid("must be a number")),
                }
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.strip_prefix('-').is_some_and(|rest| rest.parse::<u64>().is_ok()) {
                return Err(invalid("must not be negative"));
            }
            s.parse::<u32>()
                .map(Some)
                .map_err(|_| invalid("must be a non-negative integer"))
        }
        Some(_) => Err(invalid("must be a number")),
    }
}

fn field(obj: &Map<String, Value>, name: &str) -> Result<u32, RiskError> {
    Ok(parse_minutes(obj.get(name), name)?.unwrap_or(0))
}

/// Build a usage record from a JSON request body. Derived fields in the body are ignored.
pub fn parse_usage_request(body: &Value) -> Result<UsageRecord, RiskError> {
    let obj = body
        .as_object()
        .ok_or_else(|| RiskError::InvalidInput("request body must be a JSON object".into()))?;
    Ok(UsageRecord {
        instagram: field(obj, "instagram")?,
        youtube: field(obj, "youtube")?,
        whatsapp: field(obj, "whatsapp")?,
        study: field(obj, "study")?,
        night_usage: field(obj, "night_usage")?,
        red_days: field(obj, "red_days")?,
    })
}
