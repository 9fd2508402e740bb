//! Liveness endpoints.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /` — banner for anyone poking the service root.
pub async fn home() -> Json<Value> {
    Json(json!({"message": "API is running. Try /health or /snapshot"}))
}

/// `GET /health` — connection check.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
    })
}
