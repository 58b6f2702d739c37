//! Non-volatile memory collaborator
//!
//! The profile table only ever talks to flash through the [`Flash`] trait:
//! plain reads, sector erases and block programs. Two NOR simulations are
//! provided:
//!
//! - [`MemoryFlash`]: RAM image with fault injection, used by tests
//! - [`FileFlash`]: image file on disk, written through and fsynced
//!
//! # NOR semantics
//!
//! Erased bytes read as `0xFF`. Programming can only clear bits, so a program
//! over non-erased memory stores `old & new`. Callers must erase first.

mod errors;
mod file;
mod memory;

pub use errors::{FlashError, FlashResult};
pub use file::FileFlash;
pub use memory::MemoryFlash;

/// Value of every byte after an erase.
pub const ERASED_BYTE: u8 = 0xFF;

/// Block-programmable, sector-erasable non-volatile memory.
pub trait Flash {
    /// Total addressable size in bytes.
    fn capacity(&self) -> u32;

    /// Size of the unit cleared by [`Flash::erase`].
    fn erase_sector_size(&self) -> u32;

    /// Maximum size (and alignment) of a single [`Flash::write`].
    fn program_block_size(&self) -> u32;

    /// Copies `buf.len()` bytes starting at `address` into `buf`.
    fn read(&self, address: u32, buf: &mut [u8]) -> FlashResult<()>;

    /// Erases the sector containing `address`.
    fn erase(&mut self, address: u32) -> FlashResult<()>;

    /// Programs `data` at a block-aligned `address`.
    fn write(&mut self, address: u32, data: &[u8]) -> FlashResult<()>;

    /// Start address of the sector containing `address`.
    fn sector_containing(&self, address: u32) -> u32 {
        address - (address % self.erase_sector_size())
    }
}

/// Verifies that `address..address + len` lies inside a flash of `capacity` bytes.
pub(crate) fn check_range(address: u32, len: usize, capacity: u32) -> FlashResult<()> {
    let end = address as u64 + len as u64;
    if end > capacity as u64 {
        return Err(FlashError::OutOfRange {
            address,
            len,
            capacity,
        });
    }
    Ok(())
}

/// Verifies alignment and size of a program operation.
pub(crate) fn check_program(
    address: u32,
    len: usize,
    block_size: u32,
    capacity: u32,
) -> FlashResult<()> {
    if address % block_size != 0 {
        return Err(FlashError::Misaligned {
            address,
            block_size,
        });
    }
    if len > block_size as usize {
        return Err(FlashError::BlockOverflow { len, block_size });
    }
    check_range(address, len, capacity)
}

/// Applies NOR program semantics: bits can only go from 1 to 0.
pub(crate) fn program_bits(target: &mut [u8], data: &[u8]) {
    for (cell, byte) in target.iter_mut().zip(data) {
        *cell &= *byte;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_rejects_overflow() {
        assert!(check_range(0, 4096, 4096).is_ok());
        assert!(check_range(1, 4096, 4096).is_err());
        assert!(check_range(u32::MAX, 2, 4096).is_err());
    }

    #[test]
    fn test_check_program_alignment() {
        assert!(check_program(1024, 1024, 1024, 4096).is_ok());
        assert!(matches!(
            check_program(512, 16, 1024, 4096),
            Err(FlashError::Misaligned { .. })
        ));
        assert!(matches!(
            check_program(0, 2048, 1024, 4096),
            Err(FlashError::BlockOverflow { .. })
        ));
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut cells = [0xFF, 0x0F];
        program_bits(&mut cells, &[0xA5, 0xF0]);
        assert_eq!(cells, [0xA5, 0x00]);
    }
}
