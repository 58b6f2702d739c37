//! Edit session over a stream of chunk writes
//!
//! # State machine
//!
//! ```text
//! SeekingHeader --(offset 0 with column header)--> Accumulating
//! Accumulating  --(next expected offset)---------> Accumulating
//! Accumulating  --(any other offset)-------------> Aborted
//! Accumulating  --(EOF line)---------------------> Committed
//! any state     --(offset 0)---------------------> restart
//! ```
//!
//! Nothing reaches the profile table before the `EOF` line. A commit builds
//! the complete new table and hands it to [`ProfileTable::replace`] in one
//! call.

use crate::document::{COLUMN_HEADER, END_MARKER};
use crate::flash::Flash;
use crate::observability::{log_event_with_fields, Event, IngestMetrics};
use crate::storage::{ProfileName, ProfileRecord, ProfileTable};

use super::diagnostics::{Diagnostic, DiagnosticQueue, ResultCode};
use super::errors::IngestResult;
use super::line::{self, ParsedLine};

/// Line buffer size when none is configured (one chunk).
pub const DEFAULT_LINE_CAPACITY: usize = 512;

/// Buffered fragments shorter than this are dropped as noise.
const MIN_LINE_LEN: usize = 3;

/// Where the session is in the current edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for an offset 0 chunk holding the column header
    SeekingHeader,
    /// Collecting lines; the next chunk must start at `expected_offset`
    Accumulating { expected_offset: u32 },
    /// `EOF` seen and the commit attempted
    Committed,
    /// Out-of-order chunk; pending changes dropped
    Aborted,
}

/// What a single write call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Chunk not part of an edit (no header yet, or session finished)
    Ignored,
    /// Chunk consumed, edit still open
    Accepted,
    /// Chunk out of order, edit dropped
    Aborted,
    /// Edit committed to the profile table
    Committed,
}

/// Ingestion context for one profile document.
///
/// Owns everything a streamed edit needs between write calls. The profile
/// table is borrowed per call so readers can keep using it between chunks.
#[derive(Debug)]
pub struct IngestSession {
    state: SessionState,
    /// Bytes of the current line, without terminator
    line: Vec<u8>,
    line_capacity: usize,
    /// One flag per table entry at session start; set when a `***` line keeps it
    kept: Vec<bool>,
    /// New profiles, appended after the kept ones on commit
    candidates: Vec<ProfileRecord>,
    diagnostics: DiagnosticQueue,
    metrics: IngestMetrics,
}

impl Default for IngestSession {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_CAPACITY)
    }
}

impl IngestSession {
    /// Creates a session whose line buffer holds `line_capacity` bytes.
    pub fn new(line_capacity: usize) -> Self {
        Self {
            state: SessionState::SeekingHeader,
            line: Vec::with_capacity(line_capacity),
            line_capacity,
            kept: Vec::new(),
            candidates: Vec::new(),
            diagnostics: DiagnosticQueue::new(),
            metrics: IngestMetrics::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticQueue {
        &mut self.diagnostics
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    /// Resets the session and clears the diagnostics, as when the editor
    /// screen is entered.
    pub fn activate(&mut self) {
        self.diagnostics.clear();
        self.reset();
        self.state = SessionState::SeekingHeader;
    }

    /// Feeds one chunk write to the session.
    ///
    /// `chunk_offset` and `chunk_count` are in chunks; every byte of `data`
    /// is consumed.
    ///
    /// # Errors
    ///
    /// Only a failed commit returns an error. The table then still holds the
    /// profiles it had before the edit.
    pub fn write<F: Flash>(
        &mut self,
        table: &mut ProfileTable<F>,
        chunk_offset: u32,
        data: &[u8],
        chunk_count: u32,
    ) -> IngestResult<WriteOutcome> {
        let start = if chunk_offset == 0 {
            self.reset();
            self.kept = vec![false; table.len()];

            let Some(position) = find(data, COLUMN_HEADER) else {
                self.state = SessionState::SeekingHeader;
                log_event_with_fields(Event::SessionHeaderMissing, &[]);
                return Ok(WriteOutcome::Ignored);
            };

            self.state = SessionState::Accumulating {
                expected_offset: chunk_count,
            };
            self.metrics.increment_sessions_started();
            let existing = table.len().to_string();
            log_event_with_fields(Event::SessionStart, &[("existing", &existing)]);

            position + COLUMN_HEADER.len()
        } else {
            match self.state {
                SessionState::Accumulating { expected_offset } if expected_offset == chunk_offset => {
                    self.state = SessionState::Accumulating {
                        expected_offset: expected_offset.saturating_add(chunk_count),
                    };
                    0
                }
                SessionState::Accumulating { expected_offset } => {
                    self.abort(expected_offset, chunk_offset);
                    return Ok(WriteOutcome::Aborted);
                }
                _ => return Ok(WriteOutcome::Ignored),
            }
        };

        self.consume(table, &data[start..])
    }

    fn consume<F: Flash>(
        &mut self,
        table: &mut ProfileTable<F>,
        data: &[u8],
    ) -> IngestResult<WriteOutcome> {
        for &byte in data {
            if byte != b'\r' && byte != b'\n' {
                if self.line.len() >= self.line_capacity {
                    self.line.clear();
                }
                self.line.push(byte);
                continue;
            }

            if self.line.len() < MIN_LINE_LEN {
                self.line.clear();
                continue;
            }

            let line = std::mem::take(&mut self.line);
            if line.starts_with(END_MARKER) {
                self.commit(table)?;
                return Ok(WriteOutcome::Committed);
            }

            self.process_line(table, &line);
            self.line = line;
            self.line.clear();
        }

        Ok(WriteOutcome::Accepted)
    }

    fn process_line<F: Flash>(&mut self, table: &ProfileTable<F>, line: &[u8]) {
        match line::parse(line) {
            ParsedLine::Skip => {}
            ParsedLine::Rejected(diagnostic) => self.reject(diagnostic),
            ParsedLine::New(record) => {
                if table.len() + self.candidates.len() >= table.capacity() {
                    self.reject(Diagnostic::new(
                        ResultCode::FullError,
                        record.name().as_bytes(),
                    ));
                    return;
                }

                self.accept(record.name(), "new");
                self.diagnostics
                    .push(Diagnostic::new(ResultCode::NewEntry, record.name().as_bytes()));
                self.candidates.push(record);
            }
            ParsedLine::Unchanged(name) => {
                let slot = table
                    .entries()
                    .iter()
                    .zip(self.kept.iter())
                    .position(|(record, kept)| !*kept && *record.name() == name);

                match slot {
                    Some(index) => {
                        self.kept[index] = true;
                        self.accept(&name, "kept");
                    }
                    None => self.reject(Diagnostic::new(ResultCode::KeyError, name.as_bytes())),
                }
            }
        }
    }

    fn accept(&self, name: &ProfileName, result: &str) {
        self.metrics.increment_lines_accepted();
        let name = name.to_string();
        log_event_with_fields(Event::LineAccepted, &[("name", &name), ("result", result)]);
    }

    fn reject(&mut self, diagnostic: Diagnostic) {
        self.metrics.increment_lines_rejected();
        log_event_with_fields(
            Event::LineRejected,
            &[("code", diagnostic.code.as_str()), ("name", &diagnostic.name)],
        );
        self.diagnostics.push(diagnostic);
    }

    fn abort(&mut self, expected: u32, received: u32) {
        self.reset();
        self.state = SessionState::Aborted;
        self.metrics.increment_sessions_aborted();

        let expected = expected.to_string();
        let received = received.to_string();
        log_event_with_fields(
            Event::SessionAborted,
            &[("expected_offset", &expected), ("received_offset", &received)],
        );
    }

    /// Drops unkept profiles (last first), appends the new ones and
    /// replaces the table.
    fn commit<F: Flash>(&mut self, table: &mut ProfileTable<F>) -> IngestResult<()> {
        self.state = SessionState::Committed;
        log_event_with_fields(Event::CommitStart, &[]);

        let mut entries = table.entries().to_vec();
        let mut removed = 0u64;

        for index in (0..entries.len()).rev() {
            if self.kept.get(index).copied().unwrap_or(false) {
                continue;
            }
            let record = entries.remove(index);
            self.diagnostics
                .push(Diagnostic::new(ResultCode::DeletedEntry, record.name().as_bytes()));
            removed += 1;
        }

        entries.append(&mut self.candidates);
        let count = entries.len();
        self.reset();

        match table.replace(entries) {
            Ok(()) => {
                self.metrics.increment_commits();
                self.metrics.add_records_removed(removed);

                let count = count.to_string();
                let removed = removed.to_string();
                log_event_with_fields(
                    Event::CommitComplete,
                    &[("entries", &count), ("removed", &removed)],
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.increment_commit_failures();

                let code = e.code().code();
                let error = e.to_string();
                log_event_with_fields(Event::CommitFailed, &[("code", code), ("error", &error)]);
                Err(e.into())
            }
        }
    }

    fn reset(&mut self) {
        self.line.clear();
        self.kept.clear();
        self.candidates.clear();
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
