//! Record Aggregation and Submission
//!
//! Builds consistent, newest-first views over the append-only record lists
//! and submits new records without waiting for them to become final.
//!
//! ## Architecture
//!
//! - **RecordAggregator**: count once, fetch every index, stable sort
//! - **WriteGateway**: validate and forward a new record, return the pending hash
//! - **RemoteRecordStore**: the ledger traits over this service's HTTP API
//!
//! ## Typical flow
//!
//! ```rust,ignore
//! let pending = gateway.submit_record(&dentist, new_record).await?;
//! let records = aggregator.refresh_after(&pending, Role::Dentist, &dentist).await?;
//! ```

mod aggregator;
mod gateway;
mod remote;

pub use aggregator::{AggregateError, IndexedRecord, RecordAggregator, DEFAULT_FETCH_CONCURRENCY};
pub use gateway::{PendingSubmission, WriteGateway, DEFAULT_SETTLE_INTERVAL};
pub use remote::RemoteRecordStore;
