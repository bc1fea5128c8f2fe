//! Remote Record Store
//!
//! Implements the ledger traits over a running DentalChain API, so the
//! aggregator and gateway can run in a client process.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::dto::{
    CountResponse, DentistProfileResponse, ErrorResponse, HealthResponse, RecordResponse,
    SubmitRecordRequest, SubmitRecordResponse, WalletConfigResponse,
};
use crate::ledger::{
    Address, DentistProfile, LedgerError, LedgerResult, NewRecord, Record, RecordStore,
    RecordSubmitter, Role, TxHash,
};

/// Record store backed by the DentalChain HTTP API
pub struct RemoteRecordStore {
    client: Client,
    base_url: String,
}

impl RemoteRecordStore {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full health report
    pub async fn health(&self) -> LedgerResult<HealthResponse> {
        self.get("/health").await
    }

    /// Fetch the wallet and network settings served by the API
    pub async fn wallet_config(&self) -> LedgerResult<WalletConfigResponse> {
        self.get("/api/wallet/config").await
    }

    /// Submit a record and return the full pending response
    pub async fn submit(
        &self,
        dentist: &Address,
        record: &NewRecord,
    ) -> LedgerResult<SubmitRecordResponse> {
        let request = SubmitRecordRequest {
            patient: record.patient.to_string(),
            procedure: record.procedure.clone(),
            description: record.description.clone(),
            diagnosis: record.diagnosis.clone(),
        };

        let url = format!("{}/api/dentist/{}/records", self.base_url, dentist);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(LedgerError::transport)?;

        Self::parse(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> LedgerResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Remote store request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(LedgerError::transport)?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> LedgerResult<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                LedgerError::UpstreamUnavailable(format!("invalid response body: {e}"))
            });
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        Err(match status {
            StatusCode::BAD_REQUEST => LedgerError::InvalidAddress(message),
            StatusCode::UNPROCESSABLE_ENTITY => LedgerError::SubmissionRejected(message),
            _ => LedgerError::UpstreamUnavailable(format!("{status}: {message}")),
        })
    }
}

#[async_trait]
impl RecordStore for RemoteRecordStore {
    async fn record_count(&self, role: Role, owner: &Address) -> LedgerResult<u64> {
        let body: CountResponse = self.get(&format!("/api/{role}/{owner}/record-count")).await?;
        Ok(body.count)
    }

    async fn record_at(&self, role: Role, owner: &Address, index: u64) -> LedgerResult<Record> {
        let body: RecordResponse = self
            .get(&format!("/api/{role}/{owner}/records/{index}"))
            .await?;
        Ok(body.into_record())
    }

    async fn dentist_profile(&self, dentist: &Address) -> LedgerResult<DentistProfile> {
        let body: DentistProfileResponse = self.get(&format!("/api/dentist/{dentist}")).await?;
        Ok(body.into_profile())
    }

    async fn health_check(&self) -> LedgerResult<()> {
        let url = format!("{}/health/ready", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(LedgerError::transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LedgerError::UpstreamUnavailable(format!(
                "readiness check returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl RecordSubmitter for RemoteRecordStore {
    async fn submit_record(&self, dentist: &Address, record: &NewRecord) -> LedgerResult<TxHash> {
        Ok(self.submit(dentist, record).await?.transaction_hash)
    }
}
