//! Wallet Routes
//!
//! - GET /api/wallet/config - Settings for the browser wallet modal

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AppMetadata, WalletConfigResponse};
use crate::api::state::AppState;

/// GET /api/wallet/config
pub async fn wallet_config(State(state): State<Arc<AppState>>) -> Json<WalletConfigResponse> {
    let wallet = &state.wallet;

    Json(WalletConfigResponse {
        chain_id: state.ledger.chain_id(),
        network: state.ledger.network.to_string(),
        contract_address: state.ledger.contract_address,
        project_id: wallet.project_id.clone(),
        metadata: AppMetadata {
            name: wallet.app_name.clone(),
            description: wallet.app_description.clone(),
            url: wallet.app_url.clone(),
        },
    })
}
