//! Secret key field decoding
//!
//! The key column of a profile line accepts:
//!
//! - `***` : keep the stored key of the profile with the same name
//! - `"text"` : literal ASCII secret, copied byte for byte
//! - `b32"BASE32"` (or `B32"..."`) : RFC 4648 Base32 secret
//! - `abcd1234...` or `0xab 0xcd ...` : hex byte pairs, at least 8 bytes
//!
//! Decoding is pure and never touches the profile table.

mod base32;
mod hex;

use thiserror::Error;

use crate::storage::{SecretKey, KEY_CAPACITY};

/// Marker that keeps the stored key.
pub const UNCHANGED_MARKER: &[u8] = b"***";

/// Shortest accepted hex key in bytes.
pub const MIN_HEX_KEY_LEN: usize = 8;

/// Longest accepted Base32 payload in characters (320 bits).
pub const MAX_BASE32_INPUT: usize = KEY_CAPACITY * 8 / 5;

/// Why a key field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("expected 0 or 2 quote characters, found {0}")]
    QuoteCount(usize),

    #[error("quoted secret is empty")]
    Empty,

    #[error("secret of {0} bytes exceeds the 40 byte key capacity")]
    TooLong(usize),

    #[error("invalid Base32 secret")]
    Base32,

    #[error("invalid character {0:#04x} in hex secret")]
    HexCharacter(u8),

    #[error("hex secret ends with an unpaired nibble")]
    UnpairedNibble,

    #[error("hex secret of {0} bytes is shorter than 8 bytes")]
    TooShort(usize),
}

/// Outcome of decoding one key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDecode {
    /// Field decoded to raw key bytes
    Raw(SecretKey),
    /// Field is the `***` marker; the caller resolves it by profile name
    Unchanged,
    /// Field is malformed
    Invalid(KeyError),
}

/// Decodes the text of a key field (everything after the third comma).
pub fn decode(field: &[u8]) -> KeyDecode {
    match decode_field(field) {
        Ok(Some(bytes)) => {
            let len = bytes.len();
            match SecretKey::new(bytes) {
                Ok(key) => KeyDecode::Raw(key),
                Err(_) => KeyDecode::Invalid(KeyError::TooLong(len)),
            }
        }
        Ok(None) => KeyDecode::Unchanged,
        Err(e) => KeyDecode::Invalid(e),
    }
}

fn decode_field(field: &[u8]) -> Result<Option<Vec<u8>>, KeyError> {
    if trim_spaces(field) == UNCHANGED_MARKER {
        return Ok(None);
    }

    let quotes: Vec<usize> = field
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'"')
        .map(|(i, _)| i)
        .collect();

    match quotes.as_slice() {
        [] => hex::decode(field).map(Some),
        [open, close] => {
            let payload = &field[open + 1..*close];
            if is_base32_prefixed(field, *open) {
                base32::decode(payload).map(Some)
            } else {
                decode_literal(payload).map(Some)
            }
        }
        other => Err(KeyError::QuoteCount(other.len())),
    }
}

fn decode_literal(payload: &[u8]) -> Result<Vec<u8>, KeyError> {
    if payload.len() > KEY_CAPACITY {
        return Err(KeyError::TooLong(payload.len()));
    }
    Ok(payload.to_vec())
}

/// True if the three bytes before the opening quote spell `b32`.
fn is_base32_prefixed(field: &[u8], open: usize) -> bool {
    open >= 3 && field[open - 3..open].eq_ignore_ascii_case(b"b32")
}

fn trim_spaces(mut bytes: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' '] = bytes {
        bytes = rest;
    }
    bytes
}
