//! Profile document
//!
//! The profile table is exposed to the host as a single text file: an
//! instructional header, one CSV line per profile, and an `EOF` line.
//! Stored keys never appear in it; every key column reads `***`.

mod reader;
mod template;

pub use reader::{render_entry, DocumentReader};
pub use template::{COLUMN_HEADER, END_MARKER, FOOTER, HEADER, KEY_MASK, LINE_END};
