//! Flash driver error types

use thiserror::Error;

/// Result type for flash operations
pub type FlashResult<T> = Result<T, FlashError>;

/// Errors reported by a [`Flash`](super::Flash) implementation.
///
/// The profile table does not retry any of these. A failed erase or program
/// aborts the commit that issued it.
#[derive(Debug, Error)]
pub enum FlashError {
    #[error("Address range {address:#x}+{len} outside of flash (capacity {capacity})")]
    OutOfRange { address: u32, len: usize, capacity: u32 },

    #[error("Program address {address:#x} is not aligned to {block_size} byte blocks")]
    Misaligned { address: u32, block_size: u32 },

    #[error("Program of {len} bytes exceeds block size {block_size}")]
    BlockOverflow { len: usize, block_size: u32 },

    #[error("Erase of sector at {0:#x} failed")]
    EraseFailed(u32),

    #[error("Program at {0:#x} failed")]
    ProgramFailed(u32),

    #[error("Flash image I/O error: {0}")]
    Io(#[from] std::io::Error),
}
