//! Ingestion errors
//!
//! Malformed lines never surface here; they become diagnostics. The only
//! error an edit session returns is a failed commit.

use thiserror::Error;

use crate::storage::StorageError;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Writing the new table failed. The previous table is still loaded.
    #[error("commit failed: {0}")]
    Commit(#[from] StorageError),
}
