//! Chunk-addressed profile file
//!
//! Joins the document reader and the ingestion session behind the two calls
//! a block device front end makes: read some chunks, write some chunks.

mod errors;

pub use errors::{VolumeError, VolumeResult};

use crate::document::{DocumentReader, HEADER};
use crate::flash::Flash;
use crate::ingest::{DiagnosticQueue, IngestSession, WriteOutcome};
use crate::observability::IngestMetrics;
use crate::storage::ProfileTable;

/// Default chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// The profile document as seen by the host.
pub struct ProfileVolume<F: Flash> {
    table: ProfileTable<F>,
    session: IngestSession,
    chunk_size: usize,
}

impl<F: Flash> ProfileVolume<F> {
    /// Wraps `table` with chunks of `chunk_size` bytes.
    ///
    /// The header must fit in the first chunk, since that is the only chunk
    /// searched for it.
    pub fn new(table: ProfileTable<F>, chunk_size: usize) -> VolumeResult<Self> {
        if !chunk_size.is_power_of_two() || chunk_size < HEADER.len() {
            return Err(VolumeError::InvalidChunkSize(chunk_size));
        }

        Ok(Self {
            table,
            session: IngestSession::new(chunk_size),
            chunk_size,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Current document size in bytes.
    pub fn file_size(&self) -> usize {
        DocumentReader::new(self.table.entries()).compute_length()
    }

    /// Chunks needed to hold the current document.
    pub fn chunk_count(&self) -> u32 {
        ((self.file_size() + self.chunk_size - 1) / self.chunk_size) as u32
    }

    /// Fills `buf` with `chunk_count` chunks starting at `chunk_offset`.
    ///
    /// Bytes past the end of the document read as zero.
    pub fn read_chunks(&self, chunk_offset: u32, buf: &mut [u8], chunk_count: u32) -> VolumeResult<()> {
        self.check_length(buf.len(), chunk_count)?;

        let offset = chunk_offset as usize * self.chunk_size;
        let copied = DocumentReader::new(self.table.entries()).read(offset, buf);
        buf[copied..].fill(0);

        self.session.metrics().add_bytes_read(copied as u64);
        Ok(())
    }

    /// Passes `chunk_count` chunks written at `chunk_offset` to the session.
    pub fn write_chunks(
        &mut self,
        chunk_offset: u32,
        data: &[u8],
        chunk_count: u32,
    ) -> VolumeResult<WriteOutcome> {
        self.check_length(data.len(), chunk_count)?;

        let outcome = self
            .session
            .write(&mut self.table, chunk_offset, data, chunk_count)?;
        Ok(outcome)
    }

    /// Starts a fresh editing round.
    pub fn activate(&mut self) {
        self.session.activate();
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        self.session.diagnostics()
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticQueue {
        self.session.diagnostics_mut()
    }

    pub fn metrics(&self) -> &IngestMetrics {
        self.session.metrics()
    }

    pub fn session(&self) -> &IngestSession {
        &self.session
    }

    pub fn table(&self) -> &ProfileTable<F> {
        &self.table
    }

    fn check_length(&self, actual: usize, chunks: u32) -> VolumeResult<()> {
        let expected = chunks as usize * self.chunk_size;
        if actual != expected {
            return Err(VolumeError::BufferLength {
                chunks,
                expected,
                actual,
            });
        }
        Ok(())
    }
}
