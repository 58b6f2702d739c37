//! Document Masking Tests
//!
//! Covers:
//! - No stored key byte sequence ever appears in the document
//! - Every profile line ends in `***`
//! - Any read window agrees with the full document and its advertised size

use totp_vault::document::{render_entry, DocumentReader, FOOTER, HEADER, KEY_MASK};
use totp_vault::flash::MemoryFlash;
use totp_vault::storage::{
    Digits, ProfileName, ProfileRecord, ProfileTable, SecretKey, KEY_CAPACITY, MAX_ENTRIES,
};
use totp_vault::volume::ProfileVolume;

// =============================================================================
// Test Utilities
// =============================================================================

fn record(name: &str, interval: u32, digits: Digits, key: &[u8]) -> ProfileRecord {
    ProfileRecord::new(
        ProfileName::new(name.as_bytes()).unwrap(),
        interval,
        digits,
        SecretKey::new(key.to_vec()).unwrap(),
    )
    .unwrap()
}

/// Keys that would be easy to spot: printable, distinctive, full length.
fn secret_records() -> Vec<ProfileRecord> {
    (0..MAX_ENTRIES)
        .map(|i| {
            let key: Vec<u8> = format!("SECRET{:02}", i)
                .bytes()
                .cycle()
                .take(KEY_CAPACITY)
                .collect();
            let digits = if i % 3 == 0 { Digits::Eight } else { Digits::Six };
            record(&format!("acct{}", i), 1 + (i as u32 * 7) % 180, digits, &key)
        })
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// =============================================================================
// Masking
// =============================================================================

/// The rendered document never contains a stored key.
#[test]
fn test_keys_never_rendered() {
    let records = secret_records();
    let document = DocumentReader::new(&records).to_bytes();

    for record in &records {
        assert!(
            !contains(&document, record.key().as_bytes()),
            "key of {} leaked",
            record.name()
        );
        // not even the shortest distinctive piece
        assert!(!contains(&document, &record.key().as_bytes()[..8]));
    }
}

/// Each profile renders as one line ending in the mask.
#[test]
fn test_every_line_is_masked() {
    let records = secret_records();
    let document = DocumentReader::new(&records).to_bytes();
    let body = &document[HEADER.len()..document.len() - FOOTER.len()];

    let lines: Vec<&[u8]> = body
        .split(|b| *b == b'\n')
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(lines.len(), records.len());

    for (line, record) in lines.iter().zip(&records) {
        let mut expected = KEY_MASK.to_vec();
        expected.push(b'\r');
        assert!(line.ends_with(&expected));
        assert!(line.starts_with(record.name().as_bytes()));
    }
}

/// Binary keys render the same mask as text keys.
#[test]
fn test_binary_key_is_masked() {
    let line = render_entry(&record("bin", 30, Digits::Six, &[0x00, 0xFF, 0x0D, 0x0A]));
    assert_eq!(line, b"bin, 30, 6, ***\r\n".to_vec());
}

// =============================================================================
// Windows
// =============================================================================

/// Chunk-sized reads at every offset reassemble the document exactly.
#[test]
fn test_chunked_reads_reassemble_document() {
    let records = secret_records();
    let reader = DocumentReader::new(&records);
    let document = reader.to_bytes();

    for chunk_size in [1usize, 3, 64, 512, 4096] {
        let mut assembled = Vec::new();
        let mut offset = 0;
        loop {
            let mut buf = vec![0u8; chunk_size];
            let copied = reader.read(offset, &mut buf);
            if copied == 0 {
                break;
            }
            assembled.extend_from_slice(&buf[..copied]);
            offset += copied;
        }
        assert_eq!(assembled, document, "chunk size {}", chunk_size);
    }
}

/// The advertised size matches the bytes served, for every table size.
#[test]
fn test_length_matches_served_bytes() {
    let records = secret_records();
    for count in 0..=records.len() {
        let reader = DocumentReader::new(&records[..count]);
        let length = reader.compute_length();

        let mut buf = vec![0u8; length + 100];
        assert_eq!(reader.read(0, &mut buf), length);
        assert_eq!(reader.read(length, &mut buf), 0);
    }
}

/// The volume zero-fills past the end and never leaks keys either.
#[test]
fn test_volume_reads_are_masked() {
    let mut table = ProfileTable::open(MemoryFlash::new(4096, 4096, 1024), 0, 4096).unwrap();
    table.replace(secret_records()).unwrap();

    let volume = ProfileVolume::new(table, 512).unwrap();
    let chunks = volume.chunk_count();
    let mut image = vec![0xAAu8; chunks as usize * 512];
    volume.read_chunks(0, &mut image, chunks).unwrap();

    let size = volume.file_size();
    assert!(image[size..].iter().all(|b| *b == 0));
    assert_eq!(
        &image[..size],
        DocumentReader::new(volume.table().entries()).to_bytes().as_slice()
    );
    for record in volume.table().entries() {
        assert!(!contains(&image, record.key().as_bytes()));
    }
}
