//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ledger endpoint reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, LedgerHealth};
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 only while the ledger endpoint answers.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.store.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Full health status with ledger details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ledger_result = state.store.health_check().await;

    let (status, ledger_status, error) = match ledger_result {
        Ok(()) => ("healthy", "ok", None),
        Err(e) => ("unhealthy", "error", Some(e.to_string())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        ledger: LedgerHealth {
            status: ledger_status.to_string(),
            network: state.ledger.network.to_string(),
            chain_id: state.ledger.chain_id(),
            contract_address: state.ledger.contract_address,
            error,
        },
    })
}
