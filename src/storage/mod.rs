//! Profile storage
//!
//! Holds the persistent table of TOTP profiles.
//!
//! # Design Principles
//!
//! - Fixed capacity of 32 records of 64 bytes each
//! - Implicit end of table: the first slot that is not well-formed
//! - Whole-image rewrites only (erase, then program every slot)
//! - In-memory table changes only after a successful rewrite
//!
//! Secrets are stored in the clear.

mod errors;
mod record;
mod table;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use record::{
    Digits, ProfileName, ProfileRecord, RecordError, SecretKey, ERASE_SENTINEL, KEY_CAPACITY,
    MAX_INTERVAL, MIN_INTERVAL, NAME_CAPACITY, NAME_FIELD_SIZE, RECORD_SIZE,
};
pub use table::{ProfileTable, MAX_ENTRIES, TABLE_IMAGE_SIZE};
