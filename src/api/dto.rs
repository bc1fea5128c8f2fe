//! Data Transfer Objects
//!
//! Request and response types for the REST API. The same types are read
//! back by [`crate::records::RemoteRecordStore`], so every response here
//! derives both `Serialize` and `Deserialize`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Address, DentistProfile, Record, Role, TxHash};
use crate::records::{IndexedRecord, PendingSubmission};

// ============================================================================
// Record DTOs
// ============================================================================

/// Response for `GET /api/{role}/{address}/record-count`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// A single record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordResponse {
    /// Position in the owner's ledger list
    pub index: u64,
    pub counterparty: Address,
    /// Role of the counterparty (the patient in a dentist's list and vice versa)
    pub counterparty_role: Role,
    pub procedure: String,
    pub description: String,
    pub diagnosis: String,
    /// Seconds since epoch, as assigned by the ledger
    pub timestamp: u64,
    /// RFC 3339 rendering of `timestamp`, absent if out of range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RecordResponse {
    /// Build the response for an entry in `role`'s list
    pub fn new(role: Role, entry: IndexedRecord) -> Self {
        let IndexedRecord { index, record } = entry;
        let recorded_at = i64::try_from(record.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Self {
            index,
            counterparty: record.counterparty,
            counterparty_role: role.counterparty(),
            procedure: record.procedure,
            description: record.description,
            diagnosis: record.diagnosis,
            timestamp: record.timestamp,
            recorded_at,
        }
    }

    pub fn into_record(self) -> Record {
        Record {
            counterparty: self.counterparty,
            procedure: self.procedure,
            description: self.description,
            diagnosis: self.diagnosis,
            timestamp: self.timestamp,
        }
    }
}

/// Response for `GET /api/{role}/{address}/records`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub owner: Address,
    pub role: Role,
    pub total: usize,
    /// Newest first
    pub records: Vec<RecordResponse>,
}

impl RecordListResponse {
    pub fn new(role: Role, owner: Address, records: Vec<IndexedRecord>) -> Self {
        let records: Vec<RecordResponse> = records
            .into_iter()
            .map(|entry| RecordResponse::new(role, entry))
            .collect();
        Self {
            owner,
            role,
            total: records.len(),
            records,
        }
    }
}

// ============================================================================
// Submission DTOs
// ============================================================================

/// Request body for `POST /api/dentist/{address}/records`
///
/// The patient address arrives as a string so a malformed value can be
/// reported as a validation error instead of a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRecordRequest {
    pub patient: String,
    pub procedure: String,
    pub description: String,
    pub diagnosis: String,
}

/// Response for an accepted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRecordResponse {
    pub transaction_hash: TxHash,
    /// Always `"pending"`; finality is not tracked
    pub status: String,
    pub dentist: Address,
    pub patient: Address,
    pub submitted_at: DateTime<Utc>,
    /// Suggested wait before listing records again
    pub settle_interval_ms: u64,
}

impl From<PendingSubmission> for SubmitRecordResponse {
    fn from(pending: PendingSubmission) -> Self {
        Self {
            settle_interval_ms: pending.settle_interval_ms(),
            transaction_hash: pending.tx_hash,
            status: "pending".to_string(),
            dentist: pending.dentist,
            patient: pending.patient,
            submitted_at: pending.submitted_at,
        }
    }
}

// ============================================================================
// Profile and wallet DTOs
// ============================================================================

/// Response for `GET /api/dentist/{address}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentistProfileResponse {
    pub address: Address,
    pub name: String,
    pub license_number: String,
    pub clinic_name: String,
}

impl DentistProfileResponse {
    pub fn new(address: Address, profile: DentistProfile) -> Self {
        Self {
            address,
            name: profile.name,
            license_number: profile.license_number,
            clinic_name: profile.clinic_name,
        }
    }

    pub fn into_profile(self) -> DentistProfile {
        DentistProfile {
            name: self.name,
            license_number: self.license_number,
            clinic_name: self.clinic_name,
        }
    }
}

/// Response for `GET /api/wallet/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfigResponse {
    pub chain_id: u64,
    pub network: String,
    pub contract_address: Address,
    pub project_id: String,
    pub metadata: AppMetadata,
}

/// App metadata shown by the wallet modal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
}

// ============================================================================
// Health DTOs
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub ledger: LedgerHealth,
}

/// Ledger section of the full health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerHealth {
    pub status: String,
    pub network: String,
    pub chain_id: u64,
    pub contract_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error body returned by every failing route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub request_id: String,
}
