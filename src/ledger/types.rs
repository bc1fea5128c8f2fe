//! Core data types for the dental records ledger
//!
//! This module defines the values that cross the ledger boundary:
//! - `Address` and `TxHash`: fixed-size ledger identifiers
//! - `Role`: which side of a record an owner address is on
//! - `Record`, `NewRecord` and `DentistProfile`: contract data shapes

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::{DecodeError, LedgerError};

/// A 20-byte ledger account identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Length of an address in bytes
    pub const LEN: usize = 20;

    /// Build an address from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The all-zero address, used by the contract as "no account"
    pub const fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = strip_hex_prefix(s.trim())
            .ok_or_else(|| LedgerError::InvalidAddress(format!("{s:?} is missing the 0x prefix")))?;

        if hex_part.len() != Self::LEN * 2 {
            return Err(LedgerError::InvalidAddress(format!(
                "{s:?} must have {} hex digits, found {}",
                Self::LEN * 2,
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| LedgerError::InvalidAddress(format!("{s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 32-byte transaction hash returned when a write is accepted for broadcast
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = strip_hex_prefix(s.trim()).unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| DecodeError::InvalidHex(format!("transaction hash {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Participant role, selecting which per-owner record list is read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Records written by a dentist; the counterparty is the patient
    Dentist,
    /// Records about a patient; the counterparty is the dentist
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Dentist => "dentist",
            Role::Patient => "patient",
        }
    }

    /// Role of the party stored in a record's counterparty field
    pub fn counterparty(&self) -> Role {
        match self {
            Role::Dentist => Role::Patient,
            Role::Patient => Role::Dentist,
        }
    }

    /// Contract function returning the record count for an owner
    pub fn count_signature(&self) -> &'static str {
        match self {
            Role::Dentist => "getDentistRecordCount(address)",
            Role::Patient => "getPatientRecordCount(address)",
        }
    }

    /// Contract function returning one record by index for an owner
    pub fn record_signature(&self) -> &'static str {
        match self {
            Role::Dentist => "getDentistRecordByIndex(address,uint256)",
            Role::Patient => "getPatientRecordByIndex(address,uint256)",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dentist" => Ok(Role::Dentist),
            "patient" => Ok(Role::Patient),
            other => Err(format!("Invalid role: {other}. Use dentist or patient")),
        }
    }
}

/// One dental procedure event as stored on the ledger
///
/// Records are immutable once written. `timestamp` is assigned by the
/// ledger at write time (seconds since epoch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// The other party: the patient in a dentist's list, the dentist in a patient's
    pub counterparty: Address,
    pub procedure: String,
    pub description: String,
    pub diagnosis: String,
    pub timestamp: u64,
}

/// A record creation request, as accepted by `addDentalRecord`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRecord {
    pub patient: Address,
    pub procedure: String,
    pub description: String,
    pub diagnosis: String,
}

impl NewRecord {
    pub fn new(
        patient: Address,
        procedure: impl Into<String>,
        description: impl Into<String>,
        diagnosis: impl Into<String>,
    ) -> Self {
        Self {
            patient,
            procedure: procedure.into(),
            description: description.into(),
            diagnosis: diagnosis.into(),
        }
    }
}

/// Registration details of a dentist, maintained outside this service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DentistProfile {
    pub name: String,
    pub license_number: String,
    pub clinic_name: String,
}
