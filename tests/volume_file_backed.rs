//! File-Backed Volume Tests
//!
//! Covers:
//! - A committed edit survives closing and reopening the image file
//! - Read back after reopen shows the new profiles, masked
//! - A dropped edit leaves the file untouched

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use totp_vault::document::{DocumentReader, HEADER};
use totp_vault::flash::FileFlash;
use totp_vault::ingest::{ResultCode, WriteOutcome};
use totp_vault::storage::{Digits, ProfileTable};
use totp_vault::volume::{ProfileVolume, DEFAULT_CHUNK_SIZE};

// =============================================================================
// Test Utilities
// =============================================================================

const REGION_START: u32 = 4096;
const REGION_SIZE: u32 = 4096;

fn create_image(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("flash.bin");
    FileFlash::create(&path, REGION_START + REGION_SIZE, 4096, 1024).unwrap();
    path
}

fn open_volume(path: &Path) -> ProfileVolume<FileFlash> {
    let flash = FileFlash::open(path, 4096, 1024).unwrap();
    let table = ProfileTable::open(flash, REGION_START, REGION_SIZE).unwrap();
    ProfileVolume::new(table, DEFAULT_CHUNK_SIZE).unwrap()
}

fn padded_document(body: &str) -> Vec<u8> {
    let mut doc = HEADER.to_vec();
    doc.extend_from_slice(body.as_bytes());
    let len = (doc.len() + DEFAULT_CHUNK_SIZE - 1) / DEFAULT_CHUNK_SIZE * DEFAULT_CHUNK_SIZE;
    doc.resize(len, 0);
    doc
}

fn write_document(volume: &mut ProfileVolume<FileFlash>, data: &[u8]) -> WriteOutcome {
    let mut outcome = WriteOutcome::Ignored;
    for (index, chunk) in data.chunks(DEFAULT_CHUNK_SIZE).enumerate() {
        outcome = volume.write_chunks(index as u32, chunk, 1).unwrap();
        if outcome == WriteOutcome::Committed {
            break;
        }
    }
    outcome
}

fn read_document(volume: &ProfileVolume<FileFlash>) -> Vec<u8> {
    let chunks = volume.chunk_count();
    let mut data = vec![0u8; chunks as usize * DEFAULT_CHUNK_SIZE];
    volume.read_chunks(0, &mut data, chunks).unwrap();
    data.truncate(volume.file_size());
    data
}

// =============================================================================
// Durability
// =============================================================================

/// Profiles committed through the volume are in the file after reopen.
#[test]
fn test_commit_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_image(temp_dir.path());

    {
        let mut volume = open_volume(&path);
        let data = padded_document(
            "mail, 30, 6, \"SOMEKEY123\"\r\nbank, 60, 8, abcdef1234567890\r\nEOF\r\n",
        );
        assert_eq!(write_document(&mut volume, &data), WriteOutcome::Committed);
    }

    let volume = open_volume(&path);
    let entries = volume.table().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name().as_bytes(), b"mail");
    assert_eq!(entries[0].key().as_bytes(), b"SOMEKEY123");
    assert_eq!(entries[1].digits(), Digits::Eight);
    assert_eq!(entries[1].interval(), 60);
}

/// The region starts where configured; bytes before it stay erased.
#[test]
fn test_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_image(temp_dir.path());

    let mut volume = open_volume(&path);
    write_document(&mut volume, &padded_document("a, 30, 6, \"12345678\"\r\nEOF\r\n"));
    drop(volume);

    let image = fs::read(&path).unwrap();
    assert_eq!(image.len(), (REGION_START + REGION_SIZE) as usize);
    assert!(image[..REGION_START as usize].iter().all(|b| *b == 0xFF));
    assert_eq!(image[REGION_START as usize], b'a');
}

/// Reading after reopen gives the masked document of the stored table.
#[test]
fn test_export_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_image(temp_dir.path());

    {
        let mut volume = open_volume(&path);
        write_document(
            &mut volume,
            &padded_document("vpn, 45, 6, b32\"MZXW6YTBOI======\"\r\nEOF\r\n"),
        );
    }

    let volume = open_volume(&path);
    let document = read_document(&volume);
    assert_eq!(document, DocumentReader::new(volume.table().entries()).to_bytes());
    assert!(document.ends_with(b"vpn, 45, 6, ***\r\nEOF\r\n"));
    assert!(!document.windows(6).any(|w| w == b"foobar"));
}

/// A re-edit of the exported document keeps everything, across reopen.
#[test]
fn test_reedit_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_image(temp_dir.path());

    {
        let mut volume = open_volume(&path);
        write_document(
            &mut volume,
            &padded_document("a, 30, 6, \"key-a-123\"\r\nb, 90, 8, \"key-b-456\"\r\nEOF\r\n"),
        );
    }

    let before = fs::read(&path).unwrap();
    {
        let mut volume = open_volume(&path);
        let mut data = read_document(&volume);
        let len = (data.len() + DEFAULT_CHUNK_SIZE - 1) / DEFAULT_CHUNK_SIZE * DEFAULT_CHUNK_SIZE;
        data.resize(len, 0);

        volume.activate();
        assert_eq!(write_document(&mut volume, &data), WriteOutcome::Committed);
        assert!(volume.diagnostics().is_empty());
    }

    assert_eq!(fs::read(&path).unwrap(), before);
}

/// An edit that never reaches the end marker changes nothing on disk.
#[test]
fn test_unfinished_edit_leaves_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_image(temp_dir.path());
    let before = fs::read(&path).unwrap();

    {
        let mut volume = open_volume(&path);
        let outcome = write_document(
            &mut volume,
            &padded_document("a, 30, 6, \"12345678\"\r\nb, 30, 6, bad-key\r\n"),
        );
        assert_eq!(outcome, WriteOutcome::Accepted);
        assert_eq!(
            volume.diagnostics().latest().map(|d| d.code),
            Some(ResultCode::KeyError)
        );
    }

    assert_eq!(fs::read(&path).unwrap(), before);
}
