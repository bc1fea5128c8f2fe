//! Ledger error types
//!
//! Defines all errors that can occur when reading from or writing to the
//! dental records contract.

use thiserror::Error;

/// Errors raised while decoding contract return data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Return data is shorter than the expected layout
    #[error("return data truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Address word carries non-zero bytes in its padding
    #[error("word {position} is not a valid address")]
    InvalidAddress { position: usize },

    /// Integer does not fit the target type
    #[error("word {position} overflows a 64-bit integer")]
    Overflow { position: usize },

    /// Dynamic field offset points outside the return data
    #[error("offset {offset} for word {position} is out of bounds")]
    OffsetOutOfBounds { position: usize, offset: usize },

    /// String bytes are not valid UTF-8
    #[error("string at word {position} is not valid UTF-8")]
    InvalidUtf8 { position: usize },

    /// Decoded values do not match the expected record shape
    #[error("unexpected shape: {0}")]
    ShapeMismatch(String),

    /// Hex payload from the RPC endpoint is malformed
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Errors that can occur in the ledger adapter and write gateway
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Required endpoint or contract address is missing or malformed
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Network or transport failure reaching the ledger
    #[error("Ledger unavailable: {0}")]
    UpstreamUnavailable(String),

    /// JSON-RPC error object returned by the endpoint
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Contract return data did not decode into the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A write request was not accepted for broadcast
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    /// Caller supplied a malformed account identifier
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl LedgerError {
    /// Map a transport error from the HTTP client
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LedgerError::UpstreamUnavailable("request timed out".to_string())
        } else if err.is_connect() {
            LedgerError::UpstreamUnavailable(format!("connection failed: {err}"))
        } else {
            LedgerError::UpstreamUnavailable(err.to_string())
        }
    }

    /// Whether the error was caused by the caller's input rather than the ledger
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAddress(_) | LedgerError::SubmissionRejected(_)
        )
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
