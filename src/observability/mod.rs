//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Monotonic counters for edit sessions
//!
//! # Principles
//!
//! 1. Observability is read-only and never changes control flow
//! 2. No background threads
//! 3. Secret key bytes are never logged
//!
//! # Usage
//!
//! ```ignore
//! use totp_vault::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::TableLoaded, &[("entries", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{IngestMetrics, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
