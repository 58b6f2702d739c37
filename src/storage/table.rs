//! Fixed-capacity profile table backed by a flash region
//!
//! The region holds [`MAX_ENTRIES`] slots of [`RECORD_SIZE`] bytes. There is
//! no count field: a scan stops at the first slot that is not well-formed.
//!
//! Every persist rewrites the whole image. The sectors covering the table are
//! erased, then all slots (unused ones left at `0xFF`) are programmed in
//! block-sized pieces.

use crate::flash::{Flash, ERASED_BYTE};
use crate::observability::{log_event_with_fields, Event, Logger};

use super::errors::{StorageError, StorageResult};
use super::record::{ProfileRecord, RECORD_SIZE};

/// Maximum number of profiles
pub const MAX_ENTRIES: usize = 32;

/// Size of the persisted table image
pub const TABLE_IMAGE_SIZE: usize = MAX_ENTRIES * RECORD_SIZE;

/// In-memory profile table and the flash region it is persisted to.
pub struct ProfileTable<F: Flash> {
    flash: F,
    /// First byte of the region
    region_start: u32,
    /// Size of the region in bytes
    region_size: u32,
    /// Loaded or last committed profiles, in persisted order
    entries: Vec<ProfileRecord>,
}

impl<F: Flash> ProfileTable<F> {
    /// Binds the table to `region_start..region_start + region_size` and loads it.
    ///
    /// # Errors
    ///
    /// Returns `TOTP_STORAGE_INVALID_REGION` if the region cannot hold a full
    /// image, is not sector aligned, or lies outside the flash device.
    pub fn open(flash: F, region_start: u32, region_size: u32) -> StorageResult<Self> {
        if (region_size as usize) < TABLE_IMAGE_SIZE {
            return Err(StorageError::region_too_small(
                region_size,
                TABLE_IMAGE_SIZE as u32,
            ));
        }

        if region_start % flash.erase_sector_size() != 0 {
            return Err(StorageError::invalid_region(format!(
                "Region start {:#x} is not aligned to {} byte sectors",
                region_start,
                flash.erase_sector_size()
            )));
        }

        if region_start as u64 + region_size as u64 > flash.capacity() as u64 {
            return Err(StorageError::invalid_region(format!(
                "Region {:#x}+{} exceeds flash capacity {}",
                region_start,
                region_size,
                flash.capacity()
            )));
        }

        let mut table = Self {
            flash,
            region_start,
            region_size,
            entries: Vec::with_capacity(MAX_ENTRIES),
        };
        table.load();

        Ok(table)
    }

    /// Rebuilds the in-memory table from flash.
    ///
    /// Never fails: an erased or corrupt region yields an empty table, and an
    /// unreadable slot ends the scan like a sentinel would.
    pub fn load(&mut self) {
        self.entries.clear();

        let region_end = self.region_start as u64 + self.region_size as u64;
        let mut address = self.region_start;

        while self.entries.len() < MAX_ENTRIES && address as u64 + RECORD_SIZE as u64 <= region_end
        {
            let mut slot = [0u8; RECORD_SIZE];
            if let Err(e) = self.flash.read(address, &mut slot) {
                let address_field = format!("{:#x}", address);
                let error_field = e.to_string();
                log_event_with_fields(
                    Event::TableLoadStopped,
                    &[("address", &address_field), ("error", &error_field)],
                );
                break;
            }

            match ProfileRecord::decode(&slot) {
                Some(record) => self.entries.push(record),
                None => break,
            }

            address += RECORD_SIZE as u32;
        }

        let count = self.entries.len().to_string();
        log_event_with_fields(Event::TableLoaded, &[("entries", &count)]);
    }

    /// Current profiles, valid until the next mutation.
    pub fn entries(&self) -> &[ProfileRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of profiles the table holds.
    pub fn capacity(&self) -> usize {
        MAX_ENTRIES
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Mutable access to the flash device, e.g. for fault injection.
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_flash(self) -> F {
        self.flash
    }

    /// Rewrites the whole region image from the in-memory table.
    ///
    /// # Errors
    ///
    /// Erase and program failures are returned unchanged and not retried.
    /// The region may then hold a partial image.
    pub fn persist(&mut self) -> StorageResult<()> {
        let image = Self::build_image(&self.entries)?;
        self.write_image(&image)
    }

    /// Replaces the table with `entries` and persists it.
    ///
    /// The in-memory table only changes once the image is fully written; on
    /// failure the previous profiles stay in place.
    pub fn replace(&mut self, entries: Vec<ProfileRecord>) -> StorageResult<()> {
        let image = Self::build_image(&entries)?;
        self.write_image(&image)?;
        self.entries = entries;
        Ok(())
    }

    fn build_image(entries: &[ProfileRecord]) -> StorageResult<Vec<u8>> {
        if entries.len() > MAX_ENTRIES {
            return Err(StorageError::table_full(entries.len(), MAX_ENTRIES));
        }

        let mut image = vec![ERASED_BYTE; TABLE_IMAGE_SIZE];
        for (slot, record) in image.chunks_exact_mut(RECORD_SIZE).zip(entries) {
            slot.copy_from_slice(&record.encode());
        }
        Ok(image)
    }

    fn write_image(&mut self, image: &[u8]) -> StorageResult<()> {
        let sector_size = self.flash.erase_sector_size();
        let image_end = self.region_start + image.len() as u32;

        let mut sector = self.flash.sector_containing(self.region_start);
        while sector < image_end {
            self.flash
                .erase(sector)
                .map_err(|e| StorageError::erase_failed(sector, e))?;
            sector += sector_size;
        }

        let block_size = self.flash.program_block_size() as usize;
        for (index, block) in image.chunks(block_size).enumerate() {
            let address = self.region_start + (index * block_size) as u32;
            self.flash
                .write(address, block)
                .map_err(|e| StorageError::write_failed(address, e))?;
        }

        let bytes = image.len().to_string();
        let start = format!("{:#x}", self.region_start);
        Logger::trace("TABLE_IMAGE_WRITTEN", &[("bytes", &bytes), ("start", &start)]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::MemoryFlash;
    use crate::storage::record::{Digits, ProfileName, SecretKey};
    use crate::storage::StorageErrorCode;

    fn record(name: &str, interval: u32) -> ProfileRecord {
        ProfileRecord::new(
            ProfileName::new(name.as_bytes()).unwrap(),
            interval,
            Digits::Six,
            SecretKey::new(format!("secret-{}", name).into_bytes()).unwrap(),
        )
        .unwrap()
    }

    fn empty_table() -> ProfileTable<MemoryFlash> {
        ProfileTable::open(MemoryFlash::new(8192, 4096, 1024), 4096, 4096).unwrap()
    }

    #[test]
    fn test_erased_region_loads_empty() {
        let table = empty_table();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), MAX_ENTRIES);
    }

    #[test]
    fn test_region_validation() {
        let result = ProfileTable::open(MemoryFlash::new(4096, 4096, 1024), 0, 1024);
        assert_eq!(
            result.err().map(|e| e.code()),
            Some(StorageErrorCode::TotpStorageInvalidRegion)
        );

        let result = ProfileTable::open(MemoryFlash::new(8192, 4096, 1024), 1024, 4096);
        assert!(result.is_err());

        let result = ProfileTable::open(MemoryFlash::new(4096, 4096, 1024), 4096, 4096);
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_then_reload() {
        let mut table = empty_table();
        table
            .replace(vec![record("alpha", 30), record("beta", 60)])
            .unwrap();

        let reloaded = ProfileTable::open(table.into_flash(), 4096, 4096).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0], record("alpha", 30));
        assert_eq!(reloaded.entries()[1], record("beta", 60));
    }

    #[test]
    fn test_persist_erases_and_writes_full_image() {
        let mut table = empty_table();
        table.replace(vec![record("alpha", 30)]).unwrap();

        let flash = table.flash();
        assert_eq!(flash.erase_count(), 1);
        assert_eq!(flash.program_count(), TABLE_IMAGE_SIZE / 1024);

        // unused slots stay at the sentinel
        let image = &flash.image()[4096..4096 + TABLE_IMAGE_SIZE];
        assert!(image[RECORD_SIZE..].iter().all(|b| *b == ERASED_BYTE));
        // bytes past the table image are untouched by the program pass
        assert!(flash.image()[4096 + TABLE_IMAGE_SIZE..]
            .iter()
            .all(|b| *b == ERASED_BYTE));
    }

    #[test]
    fn test_shrinking_table_clears_old_slots() {
        let mut table = empty_table();
        table
            .replace(vec![record("a", 30), record("b", 30), record("c", 30)])
            .unwrap();
        table.replace(vec![record("c", 30)]).unwrap();

        let reloaded = ProfileTable::open(table.into_flash(), 4096, 4096).unwrap();
        assert_eq!(reloaded.entries(), &[record("c", 30)]);
    }

    #[test]
    fn test_scan_stops_at_corrupt_slot() {
        let mut table = empty_table();
        table
            .replace(vec![record("a", 30), record("b", 30), record("c", 30)])
            .unwrap();

        let mut flash = table.into_flash();
        // interval byte of the second slot
        flash.image_mut()[4096 + RECORD_SIZE + 16] = 0;

        let reloaded = ProfileTable::open(flash, 4096, 4096).unwrap();
        assert_eq!(reloaded.entries(), &[record("a", 30)]);
    }

    #[test]
    fn test_full_table_roundtrip() {
        let mut table = empty_table();
        let records: Vec<_> = (0..MAX_ENTRIES)
            .map(|i| record(&format!("p{}", i), (i as u32 % 180) + 1))
            .collect();
        table.replace(records.clone()).unwrap();

        let reloaded = ProfileTable::open(table.into_flash(), 4096, 4096).unwrap();
        assert_eq!(reloaded.entries(), records.as_slice());
    }

    #[test]
    fn test_too_many_records_rejected_before_erase() {
        let mut table = empty_table();
        let records: Vec<_> = (0..=MAX_ENTRIES)
            .map(|i| record(&format!("p{}", i), 30))
            .collect();

        let err = table.replace(records).unwrap_err();
        assert_eq!(err.code(), StorageErrorCode::TotpStorageTableFull);
        assert_eq!(table.flash().erase_count(), 0);
    }

    #[test]
    fn test_erase_failure_keeps_memory_table() {
        let mut table = empty_table();
        table.replace(vec![record("a", 30)]).unwrap();

        table.flash_mut().fail_next_erase();
        let err = table.replace(vec![record("b", 30)]).unwrap_err();

        assert_eq!(err.code(), StorageErrorCode::TotpStorageEraseFailed);
        assert_eq!(table.entries(), &[record("a", 30)]);
    }

    #[test]
    fn test_program_failure_is_not_retried() {
        let mut table = empty_table();
        table.flash_mut().fail_programs_after(1);

        let err = table.replace(vec![record("a", 30)]).unwrap_err();
        assert_eq!(err.code(), StorageErrorCode::TotpStorageWriteFailed);
        assert_eq!(err.address(), Some(4096 + 1024));
        assert_eq!(table.flash().program_count(), 1);
        assert!(table.is_empty());
    }
}
