//! HTTP handlers

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::risk::RiskAssessment;
use crate::tracker::{parse_add_request, AddEntryResponse, Dashboard};
use axum::{body::Bytes, extract::State, Json};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

fn json_body(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidInput(format!("malformed JSON body: {e}")))
}

/// Score a user's aggregated usage
pub async fn predict_risk(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<RiskAssessment>> {
    state.engine.ensure_ready()?;
    let value = json_body(&body)?;
    Ok(Json(state.engine.predict_json(&value)?))
}

/// Log one day's usage
pub async fn add_entry(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AddEntryResponse>> {
    let value = json_body(&body)?;
    let (usage, task) = parse_add_request(&value)?;
    Ok(Json(state.tracker.add_entry(usage, task, Local::now())?))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.tracker.dashboard()?))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.engine.is_ready(),
    })
}
