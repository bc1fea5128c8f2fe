//! Ledger Access
//!
//! Reads and writes dental records held by the `DentalRecords` contract.
//!
//! ## Architecture
//!
//! - **RecordStore**: read side (record counts, records by index, profiles)
//! - **RecordSubmitter**: write side (hand a new record to the signer)
//! - **DentalRecordsContract**: both traits over JSON-RPC
//! - **abi**: call data encoding and return data decoding
//!
//! The aggregator and write gateway depend on the traits only, so the
//! same code runs against a node directly or against this service's own
//! HTTP API (see [`crate::records::RemoteRecordStore`]).

pub mod abi;
mod contract;
mod error;
mod rpc;
mod types;

#[cfg(test)]
pub(crate) mod memory;

pub use contract::{ContractSettings, DentalRecordsContract};
pub use error::{DecodeError, LedgerError, LedgerResult};
pub use rpc::JsonRpcClient;
pub use types::{Address, DentistProfile, NewRecord, Record, Role, TxHash};

use async_trait::async_trait;

/// Read access to the per-owner record lists
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of records in `owner`'s list for `role`
    async fn record_count(&self, role: Role, owner: &Address) -> LedgerResult<u64>;

    /// Record at `index` in `owner`'s list for `role`
    ///
    /// Indices at or beyond the current count are not checked here; the
    /// ledger decides how to answer them.
    async fn record_at(&self, role: Role, owner: &Address, index: u64) -> LedgerResult<Record>;

    /// Registration details for a dentist
    async fn dentist_profile(&self, dentist: &Address) -> LedgerResult<DentistProfile>;

    /// Verify the backing ledger is reachable
    async fn health_check(&self) -> LedgerResult<()> {
        Ok(())
    }
}

/// Write access: submit a record for broadcast without waiting for finality
#[async_trait]
pub trait RecordSubmitter: Send + Sync {
    /// Submit `record` signed by `dentist`, returning the pending transaction hash
    async fn submit_record(&self, dentist: &Address, record: &NewRecord) -> LedgerResult<TxHash>;
}
