//! HTTP routes exercised through the router without binding a socket.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use screentime_risk::{
    risk::RiskEngine,
    server::{router, AppState},
    storage::InMemoryStore,
    tracker::Tracker,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(engine: RiskEngine) -> Router {
    let tracker = Tracker::new(Arc::new(InMemoryStore::default()), 60).unwrap();
    let state = AppState {
        engine: Arc::new(engine),
        tracker: Arc::new(tracker),
    };
    router(state, Path::new("frontend"))
}

fn app() -> Router {
    app_with(common::trained_engine())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn predict_risk_returns_label_and_inputs() {
    let app = app();
    let body = json!({
        "instagram": 40, "youtube": 30, "whatsapp": 10,
        "study": 20, "night_usage": 45, "red_days": 2
    })
    .to_string();
    let (status, value) = send(&app, "POST", "/predict_risk", Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({"risk": "HIGH", "total_social": 80, "night_usage": 45, "red_days": 2})
    );
}

#[tokio::test]
async fn predict_risk_empty_object_defaults_to_zero() {
    let app = app();
    let (status, value) = send(&app, "POST", "/predict_risk", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total_social"], 0);
    assert_eq!(value["night_usage"], 0);
    assert_eq!(value["red_days"], 0);
    assert!(["LOW", "MEDIUM", "HIGH"].contains(&value["risk"].as_str().unwrap()));
}

#[tokio::test]
async fn predict_risk_rejects_bad_input() {
    let app = app();
    for body in [r#"{"instagram": -5}"#, r#"{"study": "lots"}"#, "not json", ""] {
        let (status, value) = send(&app, "POST", "/predict_risk", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(value["status"], 400);
        assert!(value["error"].is_string());
    }

    // Later requests are unaffected.
    let (status, _) = send(&app, "POST", "/predict_risk", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn predict_risk_without_model_never_succeeds() {
    let app = app_with(RiskEngine::unavailable("artifact missing"));
    for body in ["{}", r#"{"instagram": 10}"#, r#"{"instagram": -1}"#] {
        let (status, value) = send(&app, "POST", "/predict_risk", Some(body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(value["status"], 503);
    }

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["model_loaded"], false);
}

#[tokio::test]
async fn add_then_dashboard() {
    let app = app();

    let (status, value) = send(&app, "POST", "/add", Some(r#"{"usage": 30, "task": "read"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({"alert": "GREEN"}));

    let (_, value) = send(&app, "POST", "/add", Some(r#"{"usage": "90"}"#)).await;
    assert_eq!(value, json!({"alert": "RED"}));

    let (status, dash) = send(&app, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["total_time"], 120);
    assert_eq!(dash["average_time"], 60.0);
    assert_eq!(dash["streak"], 0);
    assert_eq!(dash["best"], 1);
    assert_eq!(dash["green_days"], 1);
    assert_eq!(dash["red_days"], 1);

    let records = dash["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["usage_minutes"], 30);
    assert_eq!(records[0]["task"], "read");
    assert_eq!(records[0]["status"], "GREEN");
    assert_eq!(records[1]["status"], "RED");
    assert!(records[1]["task"].is_null());
}

#[tokio::test]
async fn add_requires_usage() {
    let app = app();
    let (status, _) = send(&app, "POST", "/add", Some(r#"{"task": "nothing"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "POST", "/add", Some(r#"{"usage": -3}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, dash) = send(&app, "GET", "/dashboard", None).await;
    assert_eq!(dash["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn health_reports_model_loaded() {
    let app = app();
    let (status, value) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["model_loaded"], true);
}

#[tokio::test]
async fn add_and_predict_truncate_fractional_minutes() {
    let app = app();

    let (status, value) = send(&app, "POST", "/add", Some(r#"{"usage": 60.9}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({"alert": "GREEN"}));

    let (_, dash) = send(&app, "GET", "/dashboard", None).await;
    assert_eq!(dash["records"][0]["usage_minutes"], 60);

    let (status, value) = send(&app, "POST", "/predict_risk", Some(r#"{"instagram": 40.7}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total_social"], 40);
}
