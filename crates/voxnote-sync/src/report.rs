//! Outcome of one reconciliation run.

use std::fmt;

/// Why a record could not be synced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential missing or revoked; the user must authorize again
    AuthRequired,
    /// Network trouble or rate limiting; retrying later may succeed
    Transient,
    /// The remote service rejected the record for another reason
    Remote,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::AuthRequired => "auth required",
            FailureKind::Transient => "transient",
            FailureKind::Remote => "remote",
        };
        f.write_str(label)
    }
}

/// One record that failed during a run
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub record_id: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Counters for a single run. Built fresh per invocation and never
/// persisted.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub attempted: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    /// True when at least one failure needs the user to re-authorize
    pub fn needs_reauth(&self) -> bool {
        self.failed
            .iter()
            .any(|failure| failure.kind == FailureKind::AuthRequired)
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary for logs and the command line
    pub fn summary(&self) -> String {
        format!(
            "{} attempted, {} created, {} updated, {} skipped, {} failed",
            self.attempted,
            self.created,
            self.updated,
            self.skipped,
            self.failed.len()
        )
    }
}
