//! File-backed NOR flash simulation
//!
//! The image file is the whole flash device. Every erase and program is
//! written through to the file and fsynced before returning, so a reopened
//! image reflects every operation that reported success.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::errors::{FlashError, FlashResult};
use super::{check_program, check_range, program_bits, Flash, ERASED_BYTE};

/// Flash image stored in a regular file.
pub struct FileFlash {
    /// Underlying file handle
    file: File,
    /// In-memory copy of the image; reads are served from here
    mirror: Vec<u8>,
    erase_sector_size: u32,
    program_block_size: u32,
}

impl FileFlash {
    /// Creates a new erased image file. Fails if the file already exists.
    pub fn create(
        path: &Path,
        capacity: u32,
        erase_sector_size: u32,
        program_block_size: u32,
    ) -> FlashResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)?;

        let mirror = vec![ERASED_BYTE; capacity as usize];
        file.write_all(&mirror)?;
        file.sync_all()?;

        Ok(Self {
            file,
            mirror,
            erase_sector_size,
            program_block_size,
        })
    }

    /// Opens an existing image file. Its length defines the capacity.
    pub fn open(path: &Path, erase_sector_size: u32, program_block_size: u32) -> FlashResult<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut mirror = Vec::new();
        file.read_to_end(&mut mirror)?;

        if mirror.len() > u32::MAX as usize {
            return Err(FlashError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Flash image too large: {} bytes", mirror.len()),
            )));
        }

        Ok(Self {
            file,
            mirror,
            erase_sector_size,
            program_block_size,
        })
    }

    fn write_through(&mut self, start: usize, len: usize) -> FlashResult<()> {
        self.file.seek(SeekFrom::Start(start as u64))?;
        self.file.write_all(&self.mirror[start..start + len])?;
        // fsync - the operation is not complete until the image is durable
        self.file.sync_all()?;
        Ok(())
    }
}

impl Flash for FileFlash {
    fn capacity(&self) -> u32 {
        self.mirror.len() as u32
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
        buf.copy_from_slice(&self.mirror[start..start + buf.len()]);
        Ok(())
    }

    fn erase(&mut self, address: u32) -> FlashResult<()> {
        check_range(address, 1, self.capacity())?;
        let start = self.sector_containing(address) as usize;
        let len = (self.erase_sector_size as usize).min(self.mirror.len() - start);

        self.mirror[start..start + len].fill(ERASED_BYTE);
        self.write_through(start, len)
            .map_err(|_| FlashError::EraseFailed(start as u32))
    }

    fn write(&mut self, address: u32, data: &[u8]) -> FlashResult<()> {
        check_program(
            address,
            data.len(),
            self.program_block_size,
            self.capacity(),
        )?;

        let start = address as usize;
        program_bits(&mut self.mirror[start..start + data.len()], data);
        self.write_through(start, data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_writes_erased_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flash.bin");

        let flash = FileFlash::create(&path, 8192, 4096, 1024).unwrap();
        assert_eq!(flash.capacity(), 8192);

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), 8192);
        assert!(contents.iter().all(|b| *b == ERASED_BYTE));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flash.bin");

        FileFlash::create(&path, 4096, 4096, 1024).unwrap();
        assert!(FileFlash::create(&path, 4096, 4096, 1024).is_err());
    }

    #[test]
    fn test_program_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flash.bin");

        {
            let mut flash = FileFlash::create(&path, 4096, 4096, 1024).unwrap();
            flash.erase(0).unwrap();
            flash.write(1024, b"profile").unwrap();
        }

        let flash = FileFlash::open(&path, 4096, 1024).unwrap();
        let mut buf = [0u8; 7];
        flash.read(1024, &mut buf).unwrap();
        assert_eq!(&buf, b"profile");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileFlash::open(&temp_dir.path().join("absent.bin"), 4096, 1024);
        assert!(matches!(result, Err(FlashError::Io(_))));
    }
}
