//! DentalChain API Server
//!
//! Run with: cargo run --bin dentalchain-api
//!
//! # Configuration
//!
//! Read from `$DENTALCHAIN_CONFIG` or the default config locations, then
//! overridden by environment variables:
//! - `DENTALCHAIN_API_HOST`, `DENTALCHAIN_API_PORT`: Bind address (default: 0.0.0.0:8082)
//! - `DENTALCHAIN_NETWORK`: sepolia or mainnet (default: sepolia)
//! - `DENTALCHAIN_RPC_URL`: JSON-RPC endpoint (required)
//! - `DENTALCHAIN_CONTRACT_ADDRESS`: Deployed contract address (required)
//! - `DENTALCHAIN_WALLET_PROJECT_ID`: Wallet-connector project id (required)
//! - `DENTALCHAIN_SETTLE_INTERVAL_MS`: Suggested wait after a submission (default: 2000)
//! - `RUST_LOG`: Log filter (default: the configured level)
//!
//! The server refuses to start when a required setting is missing.

use dentalchain::api::{serve, AppState, LedgerInfo};
use dentalchain::config::{Config, LoggingConfig};
use dentalchain::ledger::{DentalRecordsContract, RecordStore, RecordSubmitter};
use dentalchain::logging::{env_filter, init_logging};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config loading logs through a bootstrap subscriber until the
    // configured one is installed
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&LoggingConfig::default()))
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, Config::load_default)?;

    // Initialize tracing
    init_logging(&config.logging);

    tracing::info!("Starting DentalChain API server v{}", env!("CARGO_PKG_VERSION"));

    // Validate required settings before touching the network
    let ledger_settings = match config.ledger.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };
    let wallet_settings = match config.wallet.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Network: {} (chain id {})", config.ledger.network, ledger_settings.chain_id);
    tracing::info!("Contract: {}", ledger_settings.contract_address);

    let contract = Arc::new(DentalRecordsContract::new(&ledger_settings)?);

    // Check the endpoint serves the configured network
    match contract.chain_id().await {
        Ok(id) if id == contract.expected_chain_id() => {
            tracing::info!("Ledger connection verified");
        }
        Ok(id) => tracing::warn!(
            "RPC endpoint reports chain id {} but {} expects {}",
            id,
            config.ledger.network,
            contract.expected_chain_id()
        ),
        Err(e) => tracing::warn!("Ledger not reachable yet: {} (reads will fail until it is)", e),
    }

    let ledger = LedgerInfo {
        network: config.ledger.network,
        contract_address: ledger_settings.contract_address,
    };

    let state = AppState::new(
        Arc::clone(&contract) as Arc<dyn RecordStore>,
        contract as Arc<dyn RecordSubmitter>,
        ledger,
        wallet_settings,
        &config.records,
        config.api.clone(),
    );

    // Run server
    tracing::info!("Starting server on {}", config.api.addr());
    serve(state).await?;

    tracing::info!("DentalChain API server stopped");

    Ok(())
}
