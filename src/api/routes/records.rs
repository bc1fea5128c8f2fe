//! Record Routes
//!
//! Mounted once per role; the role arrives as a request extension.
//!
//! - GET /api/{role}/:address/record-count - Number of records
//! - GET /api/{role}/:address/records/:index - One record by ledger index
//! - GET /api/{role}/:address/records - Full list, newest first
//! - POST /api/dentist/:address/records - Submit a new record

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use super::parse_address;
use crate::api::dto::{
    CountResponse, RecordListResponse, RecordResponse, SubmitRecordRequest, SubmitRecordResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::ledger::{NewRecord, Role};
use crate::records::IndexedRecord;

/// Generic failure message per role, matching what browser clients display
fn failure(role: Role, what: &str) -> String {
    match role {
        Role::Dentist => format!("Failed to fetch {what}"),
        Role::Patient => format!("Failed to fetch patient {what}"),
    }
}

/// GET /api/{role}/:address/record-count
pub async fn record_count(
    State(state): State<Arc<AppState>>,
    Extension(role): Extension<Role>,
    Path(address): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    let owner = parse_address(&address)?;

    let count = state
        .store
        .record_count(role, &owner)
        .await
        .map_err(|e| ApiError::ledger(failure(role, "record count"), e))?;

    Ok(Json(CountResponse { count }))
}

/// GET /api/{role}/:address/records/:index
///
/// The index is not checked against the count; the ledger answers
/// out-of-range reads.
pub async fn record_at(
    State(state): State<Arc<AppState>>,
    Extension(role): Extension<Role>,
    Path((address, index)): Path<(String, String)>,
) -> ApiResult<Json<RecordResponse>> {
    let owner = parse_address(&address)?;
    let index: u64 = index
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid record index: {index}")))?;

    let record = state
        .store
        .record_at(role, &owner, index)
        .await
        .map_err(|e| ApiError::ledger(failure(role, "record"), e))?;

    Ok(Json(RecordResponse::new(role, IndexedRecord { index, record })))
}

/// GET /api/{role}/:address/records
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Extension(role): Extension<Role>,
    Path(address): Path<String>,
) -> ApiResult<Json<RecordListResponse>> {
    let owner = parse_address(&address)?;

    let records = state
        .aggregator
        .list_records(role, &owner)
        .await
        .map_err(|e| ApiError::aggregate(failure(role, "records"), e))?;

    Ok(Json(RecordListResponse::new(role, owner, records)))
}

/// POST /api/dentist/:address/records
///
/// Answers 202 as soon as the ledger accepts the transaction. The record
/// shows up in listings after it is mined.
pub async fn submit_record(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Json(req): Json<SubmitRecordRequest>,
) -> ApiResult<(StatusCode, Json<SubmitRecordResponse>)> {
    let dentist = parse_address(&address)?;
    let patient = parse_address(&req.patient)?;

    let record = NewRecord::new(patient, req.procedure, req.description, req.diagnosis);
    let pending = state
        .gateway
        .submit_record(&dentist, record)
        .await
        .map_err(|e| ApiError::ledger("Failed to add dental record", e))?;

    Ok((StatusCode::ACCEPTED, Json(pending.into())))
}
