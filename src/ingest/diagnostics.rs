//! Per-line results shown to the user after an edit
//!
//! The queue is bounded. Once full, further results are dropped silently;
//! the UI shows the newest entry and pops it when acknowledged.

use std::collections::VecDeque;
use std::fmt;

use crate::storage::{MAX_ENTRIES, NAME_CAPACITY};

/// Default queue size. One commit yields at most `MAX_ENTRIES` added and
/// `MAX_ENTRIES` deleted results, plus room for the first rejected line.
pub const QUEUE_CAPACITY: usize = 2 * MAX_ENTRIES + 1;

/// Result of processing one profile line, or of one commit removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    NewEntry,
    DeletedEntry,
    NameError,
    IntervalError,
    IntervalNumericError,
    DigitsError,
    DigitsNumericError,
    KeyError,
    FullError,
}

impl ResultCode {
    /// Stable identifier, used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::NewEntry => "new_entry",
            ResultCode::DeletedEntry => "deleted_entry",
            ResultCode::NameError => "name_error",
            ResultCode::IntervalError => "interval_error",
            ResultCode::IntervalNumericError => "interval_numeric_error",
            ResultCode::DigitsError => "digits_error",
            ResultCode::DigitsNumericError => "digits_numeric_error",
            ResultCode::KeyError => "key_error",
            ResultCode::FullError => "full_error",
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            ResultCode::NewEntry => "Profile added successfully",
            ResultCode::DeletedEntry => "Profile successfully removed",
            ResultCode::NameError => "Could not parse profile name. Profile name too long",
            ResultCode::IntervalError => {
                "Invalid interval, value is out of range. Valid range 1 - 180"
            }
            ResultCode::IntervalNumericError => {
                "Invalid interval, non numeric characters detected"
            }
            ResultCode::DigitsError => {
                "Invalid TOTP digits detected, supported values are 6 and 8"
            }
            ResultCode::DigitsNumericError => "Invalid TOTP digits, non numeric characters detected",
            ResultCode::KeyError => "Could not parse secret key",
            ResultCode::FullError => "Could not add any more profiles (no space)",
        }
    }

    /// True for codes that report a rejected line
    pub fn is_error(&self) -> bool {
        !matches!(self, ResultCode::NewEntry | ResultCode::DeletedEntry)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One queued result and the profile name it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ResultCode,
    /// Profile name as written, cut to the name capacity
    pub name: String,
}

impl Diagnostic {
    pub fn new(code: ResultCode, name: &[u8]) -> Self {
        let cut = &name[..name.len().min(NAME_CAPACITY)];
        Self {
            code,
            name: String::from_utf8_lossy(cut).into_owned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Profile: {} ({}) {}", self.name, self.code, self.code.message())
    }
}

/// Bounded queue of diagnostics, oldest first.
#[derive(Debug)]
pub struct DiagnosticQueue {
    items: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Queue sized for one full edit, see [`QUEUE_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a diagnostic. Returns false if the queue was full and it was dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push_back(diagnostic);
        true
    }

    /// Newest diagnostic, the one the UI displays.
    pub fn latest(&self) -> Option<&Diagnostic> {
        self.items.back()
    }

    /// Removes and returns the newest diagnostic.
    pub fn acknowledge(&mut self) -> Option<Diagnostic> {
        self.items.pop_back()
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ResultCode::NewEntry,
            ResultCode::DeletedEntry,
            ResultCode::NameError,
            ResultCode::IntervalError,
            ResultCode::IntervalNumericError,
            ResultCode::DigitsError,
            ResultCode::DigitsNumericError,
            ResultCode::KeyError,
            ResultCode::FullError,
        ];
        let mut names: Vec<_> = codes.iter().map(|c| c.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), codes.len());
    }

    #[test]
    fn test_is_error() {
        assert!(!ResultCode::NewEntry.is_error());
        assert!(!ResultCode::DeletedEntry.is_error());
        assert!(ResultCode::KeyError.is_error());
        assert!(ResultCode::FullError.is_error());
    }

    #[test]
    fn test_diagnostic_name_is_cut() {
        let d = Diagnostic::new(ResultCode::NameError, b"a-very-long-profile-name");
        assert_eq!(d.name, "a-very-long-pr");
    }

    #[test]
    fn test_latest_and_acknowledge() {
        let mut queue = DiagnosticQueue::new();
        queue.push(Diagnostic::new(ResultCode::NewEntry, b"a"));
        queue.push(Diagnostic::new(ResultCode::KeyError, b"b"));

        assert_eq!(queue.latest().map(|d| d.name.as_str()), Some("b"));
        assert_eq!(queue.acknowledge().map(|d| d.code), Some(ResultCode::KeyError));
        assert_eq!(queue.latest().map(|d| d.name.as_str()), Some("a"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_full_queue_drops_silently() {
        let mut queue = DiagnosticQueue::with_capacity(2);
        assert!(queue.push(Diagnostic::new(ResultCode::NewEntry, b"a")));
        assert!(queue.push(Diagnostic::new(ResultCode::NewEntry, b"b")));
        assert!(!queue.push(Diagnostic::new(ResultCode::NewEntry, b"c")));

        let names: Vec<_> = queue.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_default_capacity_holds_full_edit() {
        let mut queue = DiagnosticQueue::default();
        for i in 0..MAX_ENTRIES {
            let name = format!("old{}", i);
            assert!(queue.push(Diagnostic::new(ResultCode::DeletedEntry, name.as_bytes())));
        }
        for i in 0..MAX_ENTRIES {
            let name = format!("new{}", i);
            assert!(queue.push(Diagnostic::new(ResultCode::NewEntry, name.as_bytes())));
        }
        assert!(queue.push(Diagnostic::new(ResultCode::FullError, b"extra")));

        assert_eq!(queue.capacity(), QUEUE_CAPACITY);
        assert_eq!(queue.latest().map(|d| d.code), Some(ResultCode::FullError));
    }
}
