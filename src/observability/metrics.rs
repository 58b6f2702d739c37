//! Counters for the profile document
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters describing edit sessions and document reads
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Sessions that found the column header
    sessions_started: AtomicU64,
    /// Sessions dropped by an out-of-order chunk
    sessions_aborted: AtomicU64,
    /// Lines that produced a new or kept profile
    lines_accepted: AtomicU64,
    /// Lines rejected with a diagnostic
    lines_rejected: AtomicU64,
    /// Profiles removed by commits
    records_removed: AtomicU64,
    /// Successful commits
    commits: AtomicU64,
    /// Commits whose persistence failed
    commit_failures: AtomicU64,
    /// Document bytes served to the host
    bytes_read: AtomicU64,
}

impl IngestMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_sessions_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sessions_aborted(&self) {
        self.sessions_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lines_accepted(&self) {
        self.lines_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lines_rejected(&self) {
        self.lines_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_removed(&self, count: u64) {
        self.records_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commit_failures(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_aborted: self.sessions_aborted.load(Ordering::Relaxed),
            lines_accepted: self.lines_accepted.load(Ordering::Relaxed),
            lines_rejected: self.lines_rejected.load(Ordering::Relaxed),
            records_removed: self.records_removed.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sessions_started: u64,
    pub sessions_aborted: u64,
    pub lines_accepted: u64,
    pub lines_rejected: u64,
    pub records_removed: u64,
    pub commits: u64,
    pub commit_failures: u64,
    pub bytes_read: u64,
}
