//! Consent recording endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::endpoints::validate_patient_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Deserialize)]
pub struct ConsentQuery {
    pub patient_id: i64,
    pub granted: bool,
}

#[derive(Serialize)]
pub struct ConsentResponse {
    pub patient_id: i64,
    pub consent_granted: bool,
    pub message: &'static str,
}

/// `GET /consent` — record or overwrite a patient's consent flag.
pub async fn set(
    State(ctx): State<ApiContext>,
    Query(query): Query<ConsentQuery>,
) -> Result<Json<ConsentResponse>, ApiError> {
    validate_patient_id(query.patient_id)?;
    ctx.consent.set(query.patient_id, query.granted)?;

    tracing::info!(
        patient_id = query.patient_id,
        granted = query.granted,
        "consent recorded"
    );

    Ok(Json(ConsentResponse {
        patient_id: query.patient_id,
        consent_granted: query.granted,
        message: "Consent recorded",
    }))
}
