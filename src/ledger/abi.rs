//! Contract ABI codec
//!
//! Encodes call data for the dental records contract and decodes its return
//! data. Only the parameter types the contract uses are supported:
//! `address`, `uint256` (bounded to `u64`) and `string`.
//!
//! ## Layout
//!
//! Every value occupies one 32-byte head word. Static values sit in the head
//! directly; a `string` head word holds the offset (from the start of the
//! argument block) of its tail, which is a length word followed by the bytes
//! right-padded to a word boundary.

use sha3::{Digest, Keccak256};

use super::error::DecodeError;
use super::types::{Address, DentistProfile, Record};

/// Size of an ABI word in bytes
pub const WORD: usize = 32;

/// A value passed to or returned from the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(u64),
    String(String),
}

/// Expected type of a return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Uint,
    String,
}

/// Compute the 4-byte function selector for a canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Encode a full call: selector followed by the argument block
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

/// Encode an argument block
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(addr) => head.extend_from_slice(&address_word(addr)),
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::String(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                tail.extend_from_slice(&uint_word(s.len() as u64));
                tail.extend_from_slice(s.as_bytes());
                let padding = (WORD - s.len() % WORD) % WORD;
                tail.resize(tail.len() + padding, 0);
            }
        }
    }

    head.extend(tail);
    head
}

/// Decode return data against an expected list of types
///
/// Trailing bytes beyond the decoded layout are ignored.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, DecodeError> {
    let head_len = types.len() * WORD;
    if data.len() < head_len {
        return Err(DecodeError::Truncated {
            expected: head_len,
            actual: data.len(),
        });
    }

    types
        .iter()
        .enumerate()
        .map(|(position, ty)| {
            let word = &data[position * WORD..(position + 1) * WORD];
            match ty {
                ParamType::Address => decode_address(word, position).map(Token::Address),
                ParamType::Uint => decode_uint(word, position).map(Token::Uint),
                ParamType::String => decode_string(data, word, position).map(Token::String),
            }
        })
        .collect()
}

/// Decode a `uint256` return value (e.g. a record count)
pub fn decode_count(data: &[u8]) -> Result<u64, DecodeError> {
    match decode(&[ParamType::Uint], data)?.as_slice() {
        [Token::Uint(count)] => Ok(*count),
        other => Err(DecodeError::ShapeMismatch(format!("expected (uint256), got {other:?}"))),
    }
}

/// Decode an `(address,string,string,string,uint256)` record tuple
pub fn decode_record(data: &[u8]) -> Result<Record, DecodeError> {
    let tokens = decode(
        &[
            ParamType::Address,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::Uint,
        ],
        data,
    )?;

    match <[Token; 5]>::try_from(tokens) {
        Ok([
            Token::Address(counterparty),
            Token::String(procedure),
            Token::String(description),
            Token::String(diagnosis),
            Token::Uint(timestamp),
        ]) => Ok(Record {
            counterparty,
            procedure,
            description,
            diagnosis,
            timestamp,
        }),
        Ok(other) => Err(DecodeError::ShapeMismatch(format!(
            "expected record tuple, got {other:?}"
        ))),
        Err(tokens) => Err(DecodeError::ShapeMismatch(format!(
            "expected 5 record fields, got {}",
            tokens.len()
        ))),
    }
}

/// Decode a `(string,string,string)` dentist profile tuple
pub fn decode_profile(data: &[u8]) -> Result<DentistProfile, DecodeError> {
    let tokens = decode(&[ParamType::String; 3], data)?;

    match <[Token; 3]>::try_from(tokens) {
        Ok([Token::String(name), Token::String(license_number), Token::String(clinic_name)]) => {
            Ok(DentistProfile {
                name,
                license_number,
                clinic_name,
            })
        }
        Ok(other) => Err(DecodeError::ShapeMismatch(format!(
            "expected profile tuple, got {other:?}"
        ))),
        Err(tokens) => Err(DecodeError::ShapeMismatch(format!(
            "expected 3 profile fields, got {}",
            tokens.len()
        ))),
    }
}

fn address_word(addr: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - Address::LEN..].copy_from_slice(addr.as_bytes());
    word
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn decode_address(word: &[u8], position: usize) -> Result<Address, DecodeError> {
    let (padding, body) = word.split_at(WORD - Address::LEN);
    if padding.iter().any(|b| *b != 0) {
        return Err(DecodeError::InvalidAddress { position });
    }
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(body);
    Ok(Address::new(bytes))
}

fn decode_uint(word: &[u8], position: usize) -> Result<u64, DecodeError> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(DecodeError::Overflow { position });
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    Ok(u64::from_be_bytes(bytes))
}

fn decode_string(data: &[u8], word: &[u8], position: usize) -> Result<String, DecodeError> {
    let offset = decode_uint(word, position)? as usize;
    let len_end = offset
        .checked_add(WORD)
        .filter(|end| *end <= data.len())
        .ok_or(DecodeError::OffsetOutOfBounds { position, offset })?;

    let len = decode_uint(&data[offset..len_end], position)? as usize;
    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(DecodeError::Truncated {
            expected: len_end.saturating_add(len),
            actual: data.len(),
        })?;

    String::from_utf8(data[len_end..end].to_vec())
        .map_err(|_| DecodeError::InvalidUtf8 { position })
}

/// Parse a `0x`-prefixed hex payload returned by the RPC endpoint
pub fn decode_hex(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = payload
        .strip_prefix("0x")
        .ok_or_else(|| DecodeError::InvalidHex(format!("{payload:?} is missing the 0x prefix")))?;
    hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

/// Render bytes as a `0x`-prefixed hex payload
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
