//! DentalChain REST API
//!
//! HTTP API layer over the dental records contract, built with Axum.
//!
//! # Endpoints
//!
//! ## Dentist
//! - `GET /api/dentist/:address` - Dentist profile
//! - `GET /api/dentist/:address/record-count` - Records written by the dentist
//! - `GET /api/dentist/:address/records` - All records, newest first
//! - `GET /api/dentist/:address/records/:index` - One record by ledger index
//! - `POST /api/dentist/:address/records` - Submit a record (202, pending)
//!
//! ## Patient
//! - `GET /api/patient/:address/record-count` - Records about the patient
//! - `GET /api/patient/:address/records` - All records, newest first
//! - `GET /api/patient/:address/records/:index` - One record by ledger index
//!
//! ## Wallet
//! - `GET /api/wallet/config` - Chain, contract and wallet modal settings
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use dentalchain::api::{serve, AppState, LedgerInfo};
//! use dentalchain::config::Config;
//! use dentalchain::ledger::DentalRecordsContract;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let settings = config.ledger.settings()?;
//!     let contract = Arc::new(DentalRecordsContract::new(&settings)?);
//!     let ledger = LedgerInfo { network: config.ledger.network, contract_address: settings.contract_address };
//!
//!     let state = AppState::new(
//!         contract.clone(),
//!         contract,
//!         ledger,
//!         config.wallet.settings()?,
//!         &config.records,
//!         config.api.clone(),
//!     );
//!     serve(state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, LedgerInfo};

use axum::{
    http::{header, HeaderValue, Method, Uri},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::ledger::Role;

/// Routes shared by both roles; the role is supplied by a layer
fn role_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:address/record-count", get(routes::records::record_count))
        .route("/:address/records", get(routes::records::list_records))
        .route("/:address/records/:index", get(routes::records::record_at))
}

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let dentist_routes = role_routes()
        .route("/:address", get(routes::dentist::dentist_profile))
        .route("/:address/records", post(routes::records::submit_record))
        .layer(Extension(Role::Dentist));

    let patient_routes = role_routes().layer(Extension(Role::Patient));

    let wallet_routes = Router::new().route("/config", get(routes::wallet::wallet_config));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = state.config.request_timeout();

    // Create shared state
    let shared_state = Arc::new(state);

    let router = Router::new()
        .nest("/api/dentist", dentist_routes)
        .nest("/api/patient", patient_routes)
        .nest("/api/wallet", wallet_routes)
        .nest("/health", health_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http());

    let router = match timeout {
        Some(duration) => router.layer(TimeoutLayer::new(duration)),
        None => router,
    };

    router.layer(cors).with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("DentalChain API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("DentalChain API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
