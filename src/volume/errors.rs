use thiserror::Error;

use crate::ingest::IngestError;

pub type VolumeResult<T> = Result<T, VolumeError>;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("chunk size {0} must be a power of two that holds the document header")]
    InvalidChunkSize(usize),

    #[error("buffer of {actual} bytes does not match {chunks} chunks ({expected} bytes)")]
    BufferLength {
        chunks: u32,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
