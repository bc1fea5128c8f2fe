//! API Routes
//!
//! Route handlers organized by functionality.

pub mod dentist;
pub mod health;
pub mod records;
pub mod wallet;

use crate::api::error::{ApiError, ApiResult};
use crate::ledger::Address;

/// Parse an address path segment
pub(crate) fn parse_address(raw: &str) -> ApiResult<Address> {
    raw.parse()
        .map_err(|e: crate::ledger::LedgerError| ApiError::Validation(e.to_string()))
}
