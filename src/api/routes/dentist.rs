//! Dentist Routes
//!
//! - GET /api/dentist/:address - Registered dentist profile

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::parse_address;
use crate::api::dto::DentistProfileResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/dentist/:address
pub async fn dentist_profile(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<DentistProfileResponse>> {
    let dentist = parse_address(&address)?;

    let profile = state
        .store
        .dentist_profile(&dentist)
        .await
        .map_err(|e| ApiError::ledger("Failed to load dentist information", e))?;

    Ok(Json(DentistProfileResponse::new(dentist, profile)))
}
