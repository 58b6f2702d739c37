//! RAM-backed NOR flash simulation

use super::errors::{FlashError, FlashResult};
use super::{check_program, check_range, program_bits, Flash, ERASED_BYTE};

/// In-memory flash image.
///
/// Counts erase and program operations and can be told to fail them, which
/// lets tests observe how the profile table drives the hardware.
#[derive(Debug, Clone)]
pub struct MemoryFlash {
    image: Vec<u8>,
    erase_sector_size: u32,
    program_block_size: u32,
    erase_count: usize,
    program_count: usize,
    fail_next_erase: bool,
    /// Number of programs allowed before every further program fails
    programs_before_failure: Option<usize>,
}

impl MemoryFlash {
    /// Creates an erased image of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if either granularity is zero or does not divide `capacity`.
    pub fn new(capacity: u32, erase_sector_size: u32, program_block_size: u32) -> Self {
        assert!(erase_sector_size > 0 && capacity % erase_sector_size == 0);
        assert!(program_block_size > 0 && capacity % program_block_size == 0);

        Self {
            image: vec![ERASED_BYTE; capacity as usize],
            erase_sector_size,
            program_block_size,
            erase_count: 0,
            program_count: 0,
            fail_next_erase: false,
            programs_before_failure: None,
        }
    }

    /// Raw view of the whole image.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Mutable raw view, for corrupting images in tests.
    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Number of successful erases so far.
    pub fn erase_count(&self) -> usize {
        self.erase_count
    }

    /// Number of successful programs so far.
    pub fn program_count(&self) -> usize {
        self.program_count
    }

    /// Makes the next erase fail without touching the image.
    pub fn fail_next_erase(&mut self) {
        self.fail_next_erase = true;
    }

    /// Lets `count` more programs succeed, then fails every following one.
    pub fn fail_programs_after(&mut self, count: usize) {
        self.programs_before_failure = Some(count);
    }
}

impl Flash for MemoryFlash {
    fn capacity(&self) -> u32 {
        self.image.len() as u32
    }

    fn erase_sector_size(&self) -> u32 {
        self.erase_sector_size
    }

    fn program_block_size(&self) -> u32 {
        self.program_block_size
    }

    fn read(&self, address: u32, buf: &mut [u8]) -> FlashResult<()> {
        check_range(address, buf.len(), self.capacity())?;
        let start = address as usize;
        buf.copy_from_slice(&self.image[start..start + buf.len()]);
        Ok(())
    }

    fn erase(&mut self, address: u32) -> FlashResult<()> {
        check_range(address, 1, self.capacity())?;
        let sector = self.sector_containing(address);

        if self.fail_next_erase {
            self.fail_next_erase = false;
            return Err(FlashError::EraseFailed(sector));
        }

        let start = sector as usize;
        let end = start + self.erase_sector_size as usize;
        self.image[start..end].fill(ERASED_BYTE);
        self.erase_count += 1;
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> FlashResult<()> {
        check_program(
            address,
            data.len(),
            self.program_block_size,
            self.capacity(),
        )?;

        if let Some(remaining) = self.programs_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(FlashError::ProgramFailed(address));
            }
            *remaining -= 1;
        }

        let start = address as usize;
        program_bits(&mut self.image[start..start + data.len()], data);
        self.program_count += 1;
        Ok(())
    }
}
