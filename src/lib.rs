//! # DentalChain
//!
//! Dental records on a public ledger - a service and client for viewing and
//! appending dental-record entries held by the `DentalRecords` contract.
//!
//! ## Features
//!
//! - **Consistent views**: each owner's append-only list is read in full and
//!   sorted newest first, with ties kept in ledger order
//! - **All-or-nothing**: a single failed read fails the whole list
//! - **Pending writes**: submissions return a transaction hash immediately;
//!   callers re-list after a settle interval
//! - **Thin HTTP API**: read-only contract calls proxied as JSON
//!
//! ## Modules
//!
//! - [`ledger`]: Contract client, ABI codec and the record store traits
//! - [`records`]: Record aggregator, write gateway and remote store
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dentalchain::ledger::{Address, Role};
//! use dentalchain::records::{RecordAggregator, RemoteRecordStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RemoteRecordStore::new("http://localhost:8082", Duration::from_secs(10))?;
//!     let aggregator = RecordAggregator::new(Arc::new(store));
//!
//!     let patient: Address = "0x9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a9a".parse()?;
//!     for entry in aggregator.list_records(Role::Patient, &patient).await? {
//!         println!("{} {}", entry.record.timestamp, entry.record.procedure);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod records;

// Re-export top-level types for convenience
pub use ledger::{
    Address, DecodeError, DentalRecordsContract, DentistProfile, LedgerError, LedgerResult,
    NewRecord, Record, RecordStore, RecordSubmitter, Role, TxHash,
};

pub use records::{
    AggregateError, IndexedRecord, PendingSubmission, RecordAggregator, RemoteRecordStore,
    WriteGateway,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, Network};
