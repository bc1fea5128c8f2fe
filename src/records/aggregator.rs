//! Record Aggregator
//!
//! Materializes an owner's full record list from a [`RecordStore`] and
//! returns it newest first.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::gateway::PendingSubmission;
use crate::ledger::{Address, LedgerError, Record, RecordStore, Role};

/// Default number of record fetches kept in flight at once
pub const DEFAULT_FETCH_CONCURRENCY: usize = 32;

/// A record together with its position in the owner's ledger list
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexedRecord {
    pub index: u64,
    #[serde(flatten)]
    pub record: Record,
}

/// Builds ordered record views from a record store
pub struct RecordAggregator {
    store: Arc<dyn RecordStore>,
    fetch_concurrency: usize,
}

impl RecordAggregator {
    /// Create an aggregator with the default fetch concurrency
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_concurrency(store, DEFAULT_FETCH_CONCURRENCY)
    }

    /// Create an aggregator with a custom in-flight fetch limit (minimum 1)
    pub fn with_concurrency(store: Arc<dyn RecordStore>, fetch_concurrency: usize) -> Self {
        Self {
            store,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// List every record for `owner` in `role`, newest first
    ///
    /// The count is read once; indices `0..count` are then fetched
    /// concurrently and the call only returns once all of them succeeded.
    /// Records with equal timestamps keep ascending index order. Records
    /// appended after the count was read are not included.
    pub async fn list_records(
        &self,
        role: Role,
        owner: &Address,
    ) -> Result<Vec<IndexedRecord>, AggregateError> {
        let started = Instant::now();
        let count = self.store.record_count(role, owner).await?;

        if count == 0 {
            tracing::debug!(role = %role, owner = %owner, "No records on ledger");
            return Ok(Vec::new());
        }

        // buffered() yields in index order regardless of completion order
        let mut records: Vec<IndexedRecord> = stream::iter(0..count)
            .map(|index| self.fetch(role, owner, index))
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        records.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));

        tracing::debug!(
            role = %role,
            owner = %owner,
            count,
            duration_ms = started.elapsed().as_millis() as u64,
            "Aggregated records"
        );

        Ok(records)
    }

    /// Wait out a submission's settle interval, then list again
    ///
    /// Finality is not observable here, so the new record may still be
    /// missing from the result.
    pub async fn refresh_after(
        &self,
        pending: &PendingSubmission,
        role: Role,
        owner: &Address,
    ) -> Result<Vec<IndexedRecord>, AggregateError> {
        pending.settle().await;
        self.list_records(role, owner).await
    }

    async fn fetch(
        &self,
        role: Role,
        owner: &Address,
        index: u64,
    ) -> Result<IndexedRecord, AggregateError> {
        self.store
            .record_at(role, owner, index)
            .await
            .map(|record| IndexedRecord { index, record })
            .map_err(|source| {
                tracing::warn!(role = %role, owner = %owner, index, error = %source, "Record fetch failed");
                AggregateError::PartialFetchFailure { index, source }
            })
    }
}

/// Errors that can occur while aggregating records
#[derive(Error, Debug)]
pub enum AggregateError {
    /// Reading the record count failed; no record was fetched
    #[error(transparent)]
    Count(#[from] LedgerError),

    /// A per-index fetch failed; the whole list is discarded
    #[error("Failed to fetch record {index}: {source}")]
    PartialFetchFailure {
        index: u64,
        #[source]
        source: LedgerError,
    },
}

impl AggregateError {
    /// The ledger error that caused the failure
    pub fn ledger_error(&self) -> &LedgerError {
        match self {
            AggregateError::Count(e) => e,
            AggregateError::PartialFetchFailure { source, .. } => source,
        }
    }
}
