//! Streaming ingestion of edited profile documents
//!
//! The host writes the edited document back in chunks. An [`IngestSession`]
//! turns that stream into lines, validates each line on its own, and on the
//! `EOF` line replaces the profile table in one step.
//!
//! # Rules
//!
//! - A session starts only at chunk offset 0, after the column header
//! - Chunks must then arrive in order; any gap drops the edit
//! - A bad line is reported and skipped, it never fails the edit
//! - Profiles without a `***` line are removed on commit

mod diagnostics;
mod errors;
mod line;
mod session;

pub use diagnostics::{Diagnostic, DiagnosticQueue, ResultCode, QUEUE_CAPACITY};
pub use errors::{IngestError, IngestResult};
pub use session::{IngestSession, SessionState, WriteOutcome, DEFAULT_LINE_CAPACITY};
