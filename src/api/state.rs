//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, Network, RecordsConfig, WalletSettings};
use crate::ledger::{Address, RecordStore, RecordSubmitter};
use crate::records::{RecordAggregator, WriteGateway};

/// Where the contract lives, as reported to clients
#[derive(Debug, Clone, Copy)]
pub struct LedgerInfo {
    pub network: Network,
    pub contract_address: Address,
}

impl LedgerInfo {
    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }
}

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Ledger read side, used directly for single-record routes
    pub store: Arc<dyn RecordStore>,
    /// Aggregator over `store` for list routes
    pub aggregator: Arc<RecordAggregator>,
    /// Gateway for record submissions
    pub gateway: Arc<WriteGateway>,
    /// Network and contract served
    pub ledger: LedgerInfo,
    /// Wallet-connector settings handed to browser clients
    pub wallet: Arc<WalletSettings>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state over a ledger that serves both reads and writes
    pub fn new(
        store: Arc<dyn RecordStore>,
        submitter: Arc<dyn RecordSubmitter>,
        ledger: LedgerInfo,
        wallet: WalletSettings,
        records: &RecordsConfig,
        config: ApiConfig,
    ) -> Self {
        let aggregator = RecordAggregator::with_concurrency(Arc::clone(&store), records.fetch_concurrency);
        let gateway = WriteGateway::new(submitter, records.settle_interval());

        Self {
            store,
            aggregator: Arc::new(aggregator),
            gateway: Arc::new(gateway),
            ledger,
            wallet: Arc::new(wallet),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
