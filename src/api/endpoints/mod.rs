//! Route handlers.

pub mod chat;
pub mod consent;
pub mod health;
pub mod snapshot;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Reject non-positive patient identifiers before doing any work.
pub(crate) fn validate_patient_id(patient_id: i64) -> Result<(), ApiError> {
    if patient_id < 1 {
        return Err(ApiError::BadRequest(
            "patient_id must be a positive integer".into(),
        ));
    }
    Ok(())
}

/// Consent gate for data-bearing routes. The snapshot builder itself
/// never checks consent; it is enforced here before any fetch starts.
pub(crate) fn require_consent(ctx: &ApiContext, patient_id: i64) -> Result<(), ApiError> {
    validate_patient_id(patient_id)?;
    if !ctx.consent.is_granted(patient_id) {
        return Err(ApiError::ConsentDenied);
    }
    Ok(())
}
