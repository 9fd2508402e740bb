//! Assistant endpoints.
//!
//! Both routes build a fresh snapshot behind the consent gate;
//! `/chat` answers with the configured backend while `/chatmock`
//! always serves the deterministic template answer.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::endpoints::require_consent;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::assistant::ChatReply;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub patient_id: i64,
    pub prompt: String,
}

/// `POST /chat` — answer a prompt against the patient's snapshot.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    require_consent(&ctx, req.patient_id)?;
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt cannot be empty".into()));
    }

    let snapshot = ctx.snapshots.build(req.patient_id).await?;
    let reply = ctx.assistant.answer(req.prompt.trim(), snapshot).await;
    Ok(Json(reply))
}

/// `POST /chatmock` — the template answer, regardless of backend.
pub async fn send_mock(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    require_consent(&ctx, req.patient_id)?;

    let snapshot = ctx.snapshots.build(req.patient_id).await?;
    Ok(Json(ctx.assistant.mock_reply(snapshot)))
}
