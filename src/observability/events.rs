//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events of the profile store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & configuration
    /// Tooling startup begins
    BootStart,
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Profile table
    /// Table scanned from flash
    TableLoaded,
    /// Table scan stopped before reaching capacity on an unreadable slot
    TableLoadStopped,

    // Edit sessions
    /// Column header found in an offset-0 chunk
    SessionStart,
    /// Offset-0 chunk without the column header
    SessionHeaderMissing,
    /// Out-of-order chunk dropped the pending edit
    SessionAborted,
    /// Line accepted (new or kept profile)
    LineAccepted,
    /// Line rejected with a diagnostic
    LineRejected,

    // Commit
    /// Commit begins
    CommitStart,
    /// New table persisted
    CommitComplete,
    /// Persistence failed, previous table kept in memory
    CommitFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "TOTP_VAULT_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::TableLoaded => "TABLE_LOADED",
            Event::TableLoadStopped => "TABLE_LOAD_STOPPED",

            Event::SessionStart => "SESSION_START",
            Event::SessionHeaderMissing => "SESSION_HEADER_MISSING",
            Event::SessionAborted => "SESSION_ABORTED",
            Event::LineAccepted => "LINE_ACCEPTED",
            Event::LineRejected => "LINE_REJECTED",

            Event::CommitStart => "COMMIT_BEGIN",
            Event::CommitComplete => "COMMIT_COMPLETE",
            Event::CommitFailed => "COMMIT_FAILED",
        }
    }

    /// Returns true if this event indicates a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::CommitFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
