//! Snapshot endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::endpoints::require_consent;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::snapshot::Snapshot;

#[derive(Deserialize)]
pub struct SnapshotQuery {
    pub patient_id: i64,
}

/// `GET /snapshot` — consent-gated record snapshot for one patient.
pub async fn get(
    State(ctx): State<ApiContext>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<Snapshot>, ApiError> {
    require_consent(&ctx, query.patient_id)?;

    let snapshot = ctx.snapshots.build(query.patient_id).await?;
    Ok(Json(snapshot))
}
