//! Profile record types and the fixed 64-byte slot layout
//!
//! Slot layout (little endian), compatible with deployed images:
//!
//! ```text
//! +--------+------------------------------------------+
//! | 0..15  | Name (NUL terminated, NUL padded)         |
//! | 15     | Digits code (6 or 8)                      |
//! | 16     | Interval in seconds (1..=180)             |
//! | 17..20 | Reserved, written as zero                 |
//! | 20..24 | Key length (u32 LE, at most 40)           |
//! | 24..64 | Key bytes, zero padded                    |
//! +--------+------------------------------------------+
//! ```
//!
//! A slot whose first byte is the erase sentinel `0xFF`, whose digits code is
//! not 6 or 8, or whose interval is 0 is not well-formed and marks the end of
//! the table.

use std::fmt;

use thiserror::Error;

/// Size of one stored record.
pub const RECORD_SIZE: usize = 64;

/// Bytes reserved for the name, including the terminator.
pub const NAME_FIELD_SIZE: usize = 15;

/// Longest usable profile name in bytes.
pub const NAME_CAPACITY: usize = NAME_FIELD_SIZE - 1;

/// Longest secret key in bytes (320 bits).
pub const KEY_CAPACITY: usize = 40;

/// Valid interval range in seconds.
pub const MIN_INTERVAL: u32 = 1;
pub const MAX_INTERVAL: u32 = 180;

/// First name byte of a never-written slot.
pub const ERASE_SENTINEL: u8 = 0xFF;

const DIGITS_OFFSET: usize = 15;
const INTERVAL_OFFSET: usize = 16;
const KEY_LEN_OFFSET: usize = 20;
const KEY_OFFSET: usize = 24;

const _: () = assert!(KEY_OFFSET + KEY_CAPACITY == RECORD_SIZE);

/// Reasons a profile field is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Profile name is {0} bytes, at most 14 allowed")]
    NameTooLong(usize),

    #[error("Profile name contains a NUL or sentinel byte")]
    InvalidNameByte,

    #[error("Unsupported digit count {0}, expected 6 or 8")]
    InvalidDigits(u32),

    #[error("Interval {0} outside of 1..=180")]
    IntervalOutOfRange(u32),

    #[error("Secret key is {0} bytes, at most 40 allowed")]
    KeyTooLong(usize),
}

/// Number of digits shown for a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digits {
    Six = 6,
    Eight = 8,
}

impl Digits {
    /// Decodes the stored digits byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            6 => Some(Digits::Six),
            8 => Some(Digits::Eight),
            _ => None,
        }
    }

    /// Validates a parsed digit count.
    pub fn from_value(value: u32) -> Result<Self, RecordError> {
        match value {
            6 => Ok(Digits::Six),
            8 => Ok(Digits::Eight),
            other => Err(RecordError::InvalidDigits(other)),
        }
    }

    /// Returns the stored digits byte.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Display name of a profile, also the key used to match edited lines.
///
/// Kept as raw bytes so names read from an image round-trip exactly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProfileName(Vec<u8>);

impl ProfileName {
    /// Validates a name entered by the user.
    pub fn new(name: &[u8]) -> Result<Self, RecordError> {
        if name.len() > NAME_CAPACITY {
            return Err(RecordError::NameTooLong(name.len()));
        }
        if name.first() == Some(&ERASE_SENTINEL) || name.contains(&0) {
            return Err(RecordError::InvalidNameByte);
        }
        Ok(Self(name.to_vec()))
    }

    /// Returns the name bytes without terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the name in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProfileName({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Raw TOTP secret.
///
/// `Debug` only reveals the length.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self, RecordError> {
        if bytes.len() > KEY_CAPACITY {
            return Err(RecordError::KeyTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes>)", self.0.len())
    }
}

/// One TOTP profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    name: ProfileName,
    digits: Digits,
    interval: u8,
    key: SecretKey,
}

impl ProfileRecord {
    /// Builds a record, validating the interval range.
    pub fn new(
        name: ProfileName,
        interval: u32,
        digits: Digits,
        key: SecretKey,
    ) -> Result<Self, RecordError> {
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&interval) {
            return Err(RecordError::IntervalOutOfRange(interval));
        }
        Ok(Self {
            name,
            digits,
            interval: interval as u8,
            key,
        })
    }

    pub fn name(&self) -> &ProfileName {
        &self.name
    }

    pub fn digits(&self) -> Digits {
        self.digits
    }

    /// Code refresh interval in seconds.
    pub fn interval(&self) -> u32 {
        self.interval as u32
    }

    pub fn key(&self) -> &SecretKey {
        &self.key
    }

    /// Serializes the record into its slot image.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut slot = [0u8; RECORD_SIZE];

        let name = self.name.as_bytes();
        slot[..name.len()].copy_from_slice(name);

        slot[DIGITS_OFFSET] = self.digits.code();
        slot[INTERVAL_OFFSET] = self.interval;

        let key = self.key.as_bytes();
        slot[KEY_LEN_OFFSET..KEY_OFFSET].copy_from_slice(&(key.len() as u32).to_le_bytes());
        slot[KEY_OFFSET..KEY_OFFSET + key.len()].copy_from_slice(key);

        slot
    }

    /// Decodes a slot image.
    ///
    /// Returns `None` when the slot is not well-formed, which ends a table scan.
    pub fn decode(slot: &[u8; RECORD_SIZE]) -> Option<Self> {
        if slot[0] == ERASE_SENTINEL {
            return None;
        }

        let digits = Digits::from_code(slot[DIGITS_OFFSET])?;

        let interval = slot[INTERVAL_OFFSET];
        if interval == 0 {
            return None;
        }

        let key_len = u32::from_le_bytes([
            slot[KEY_LEN_OFFSET],
            slot[KEY_LEN_OFFSET + 1],
            slot[KEY_LEN_OFFSET + 2],
            slot[KEY_LEN_OFFSET + 3],
        ]) as usize;
        if key_len > KEY_CAPACITY {
            return None;
        }

        let name_len = slot[..NAME_CAPACITY]
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(NAME_CAPACITY);

        Some(Self {
            name: ProfileName(slot[..name_len].to_vec()),
            digits,
            interval,
            key: SecretKey(slot[KEY_OFFSET..KEY_OFFSET + key_len].to_vec()),
        })
    }
}
