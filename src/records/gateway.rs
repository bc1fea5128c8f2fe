//! Write Gateway
//!
//! Forwards new records to a [`RecordSubmitter`] and hands back the pending
//! transaction. The gateway never waits for finality; callers that want to
//! see the new record should wait the settle interval and list again.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::ledger::{Address, LedgerError, LedgerResult, NewRecord, RecordSubmitter, TxHash};

/// Observed default time for a submission to become readable
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_secs(2);

/// A write accepted for broadcast but not known to be final
#[derive(Debug, Clone, Serialize)]
pub struct PendingSubmission {
    pub tx_hash: TxHash,
    pub dentist: Address,
    pub patient: Address,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip)]
    pub settle_interval: Duration,
}

impl PendingSubmission {
    /// Sleep for the settle interval
    pub async fn settle(&self) {
        if !self.settle_interval.is_zero() {
            tokio::time::sleep(self.settle_interval).await;
        }
    }

    /// Settle interval in milliseconds, for API responses
    pub fn settle_interval_ms(&self) -> u64 {
        self.settle_interval.as_millis() as u64
    }
}

/// Submits new records to the ledger
pub struct WriteGateway {
    submitter: Arc<dyn RecordSubmitter>,
    settle_interval: Duration,
}

impl WriteGateway {
    pub fn new(submitter: Arc<dyn RecordSubmitter>, settle_interval: Duration) -> Self {
        Self {
            submitter,
            settle_interval,
        }
    }

    pub fn settle_interval(&self) -> Duration {
        self.settle_interval
    }

    /// Submit a record written by `dentist` about `record.patient`
    ///
    /// Blank fields are rejected locally; everything else is up to the
    /// ledger. Any failure surfaces as `SubmissionRejected`.
    pub async fn submit_record(
        &self,
        dentist: &Address,
        record: NewRecord,
    ) -> LedgerResult<PendingSubmission> {
        validate_new_record(dentist, &record)?;

        let tx_hash = self
            .submitter
            .submit_record(dentist, &record)
            .await
            .map_err(|e| match e {
                LedgerError::SubmissionRejected(_) => e,
                other => LedgerError::SubmissionRejected(other.to_string()),
            })?;

        tracing::info!(
            tx_hash = %tx_hash,
            dentist = %dentist,
            patient = %record.patient,
            "Dental record submitted"
        );

        Ok(PendingSubmission {
            tx_hash,
            dentist: *dentist,
            patient: record.patient,
            submitted_at: Utc::now(),
            settle_interval: self.settle_interval,
        })
    }
}

fn validate_new_record(dentist: &Address, record: &NewRecord) -> LedgerResult<()> {
    if dentist.is_zero() {
        return Err(LedgerError::SubmissionRejected(
            "dentist address cannot be the zero address".to_string(),
        ));
    }
    if record.patient.is_zero() {
        return Err(LedgerError::SubmissionRejected(
            "patient address cannot be the zero address".to_string(),
        ));
    }

    for (field, value) in [
        ("procedure", &record.procedure),
        ("description", &record.description),
        ("diagnosis", &record.diagnosis),
    ] {
        if value.trim().is_empty() {
            return Err(LedgerError::SubmissionRejected(format!(
                "{field} is required"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::MemoryLedger;
    use crate::ledger::Role;
    use crate::records::RecordAggregator;

    const DENTIST: Address = Address::new([0xd1; 20]);
    const PATIENT: Address = Address::new([0x9a; 20]);

    fn new_record() -> NewRecord {
        NewRecord::new(PATIENT, "Extraction", "Wisdom tooth, lower right", "Impacted")
    }

    #[tokio::test]
    async fn test_submit_returns_pending_hash() {
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = WriteGateway::new(ledger, Duration::from_millis(5));

        let pending = gateway.submit_record(&DENTIST, new_record()).await.unwrap();
        assert_eq!(pending.dentist, DENTIST);
        assert_eq!(pending.patient, PATIENT);
        assert_eq!(pending.settle_interval_ms(), 5);
        assert_eq!(pending.tx_hash, TxHash::new([1; 32]));
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected() {
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = WriteGateway::new(ledger, DEFAULT_SETTLE_INTERVAL);

        let mut record = new_record();
        record.diagnosis = "   ".to_string();
        let err = gateway.submit_record(&DENTIST, record).await.unwrap_err();
        match err {
            LedgerError::SubmissionRejected(msg) => assert_eq!(msg, "diagnosis is required"),
            other => panic!("expected SubmissionRejected, got {other:?}"),
        }

        let mut record = new_record();
        record.patient = Address::zero();
        assert!(matches!(
            gateway.submit_record(&DENTIST, record).await,
            Err(LedgerError::SubmissionRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_ledger_refusal_is_submission_rejected() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.reject_submissions();
        let gateway = WriteGateway::new(ledger, DEFAULT_SETTLE_INTERVAL);

        let err = gateway.submit_record(&DENTIST, new_record()).await.unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionRejected(_)));
    }

    #[tokio::test]
    async fn test_immediate_list_may_miss_new_record() {
        let ledger = Arc::new(MemoryLedger::new().with_timestamps(Role::Dentist, DENTIST, &[100]));
        let gateway = WriteGateway::new(Arc::clone(&ledger) as Arc<dyn RecordSubmitter>, Duration::ZERO);
        let aggregator = RecordAggregator::new(Arc::clone(&ledger) as Arc<dyn crate::ledger::RecordStore>);

        gateway.submit_record(&DENTIST, new_record()).await.unwrap();

        // not yet mined: absence is the expected eventual-consistency gap
        let before = aggregator.list_records(Role::Dentist, &DENTIST).await.unwrap();
        assert_eq!(before.len(), 1);

        ledger.confirm_pending(200);
        let after = aggregator.list_records(Role::Dentist, &DENTIST).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].record.procedure, "Extraction");
        assert_eq!(after[0].record.counterparty, PATIENT);

        let patient_view = aggregator.list_records(Role::Patient, &PATIENT).await.unwrap();
        assert_eq!(patient_view.len(), 1);
        assert_eq!(patient_view[0].record.counterparty, DENTIST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_waits_settle_interval() {
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = WriteGateway::new(Arc::clone(&ledger) as Arc<dyn RecordSubmitter>, DEFAULT_SETTLE_INTERVAL);
        let aggregator = RecordAggregator::new(Arc::clone(&ledger) as Arc<dyn crate::ledger::RecordStore>);

        let pending = gateway.submit_record(&DENTIST, new_record()).await.unwrap();

        let confirmer = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                ledger.confirm_pending(500);
            })
        };

        let started = tokio::time::Instant::now();
        let records = aggregator
            .refresh_after(&pending, Role::Dentist, &DENTIST)
            .await
            .unwrap();
        confirmer.await.unwrap();

        assert!(started.elapsed() >= DEFAULT_SETTLE_INTERVAL);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.timestamp, 500);
    }
}
