//! In-memory ledger used by tests
//!
//! Holds per-owner record lists, counts every read, and can be told to fail
//! specific calls. Submissions stay pending until `confirm_pending` runs, the
//! way a real ledger only exposes a write after the block is mined.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::error::{LedgerError, LedgerResult};
use super::types::{Address, DentistProfile, NewRecord, Record, Role, TxHash};
use super::{RecordStore, RecordSubmitter};

#[derive(Default)]
pub struct MemoryLedger {
    lists: Mutex<HashMap<(Role, Address), Vec<Record>>>,
    profiles: Mutex<HashMap<Address, DentistProfile>>,
    pending: Mutex<Vec<(Address, NewRecord)>>,
    fail_count: Mutex<bool>,
    fail_index: Mutex<Option<u64>>,
    reject_submissions: Mutex<bool>,
    pub count_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub fetched_indices: Mutex<Vec<u64>>,
    clock: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `owner`'s list with records carrying the given timestamps
    pub fn with_timestamps(self, role: Role, owner: Address, timestamps: &[u64]) -> Self {
        let records = timestamps
            .iter()
            .enumerate()
            .map(|(i, ts)| Record {
                counterparty: Address::new([i as u8 + 1; 20]),
                procedure: format!("procedure-{i}"),
                description: format!("description-{i}"),
                diagnosis: format!("diagnosis-{i}"),
                timestamp: *ts,
            })
            .collect();
        self.lists.lock().unwrap().insert((role, owner), records);
        self
    }

    pub fn with_profile(self, dentist: Address, profile: DentistProfile) -> Self {
        self.profiles.lock().unwrap().insert(dentist, profile);
        self
    }

    pub fn fail_count(&self) {
        *self.fail_count.lock().unwrap() = true;
    }

    pub fn fail_index(&self, index: u64) {
        *self.fail_index.lock().unwrap() = Some(index);
    }

    pub fn reject_submissions(&self) {
        *self.reject_submissions.lock().unwrap() = true;
    }

    pub fn reads(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Mine every pending submission into both parties' lists
    pub fn confirm_pending(&self, timestamp: u64) {
        let pending: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let mut lists = self.lists.lock().unwrap();
        for (dentist, new_record) in pending {
            let make = |counterparty| Record {
                counterparty,
                procedure: new_record.procedure.clone(),
                description: new_record.description.clone(),
                diagnosis: new_record.diagnosis.clone(),
                timestamp,
            };
            lists
                .entry((Role::Dentist, dentist))
                .or_default()
                .push(make(new_record.patient));
            lists
                .entry((Role::Patient, new_record.patient))
                .or_default()
                .push(make(dentist));
        }
    }
}

#[async_trait]
impl RecordStore for MemoryLedger {
    async fn record_count(&self, role: Role, owner: &Address) -> LedgerResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_count.lock().unwrap() {
            return Err(LedgerError::UpstreamUnavailable("connection refused".into()));
        }
        let lists = self.lists.lock().unwrap();
        Ok(lists.get(&(role, *owner)).map(|l| l.len() as u64).unwrap_or(0))
    }

    async fn record_at(&self, role: Role, owner: &Address, index: u64) -> LedgerResult<Record> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched_indices.lock().unwrap().push(index);
        // yield so concurrent fetches interleave
        tokio::task::yield_now().await;

        if *self.fail_index.lock().unwrap() == Some(index) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: format!("header not found for index {index}"),
            });
        }
        let lists = self.lists.lock().unwrap();
        lists
            .get(&(role, *owner))
            .and_then(|l| l.get(index as usize))
            .cloned()
            .ok_or_else(|| LedgerError::Rpc {
                code: 3,
                message: "execution reverted".into(),
            })
    }

    async fn dentist_profile(&self, dentist: &Address) -> LedgerResult<DentistProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(dentist)
            .cloned()
            .ok_or_else(|| LedgerError::Rpc {
                code: 3,
                message: "execution reverted: dentist not registered".into(),
            })
    }
}

#[async_trait]
impl RecordSubmitter for MemoryLedger {
    async fn submit_record(&self, dentist: &Address, record: &NewRecord) -> LedgerResult<TxHash> {
        if *self.reject_submissions.lock().unwrap() {
            return Err(LedgerError::SubmissionRejected("signer unavailable".into()));
        }
        self.pending.lock().unwrap().push((*dentist, record.clone()));
        let n = self.clock.fetch_add(1, Ordering::SeqCst) as u8;
        Ok(TxHash::new([n.wrapping_add(1); 32]))
    }
}
