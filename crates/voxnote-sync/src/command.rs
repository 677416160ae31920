//! Commands the reconciler executes.
//!
//! UI and CLI layers build one of these per user action and hand it to
//! [`crate::Reconciler::dispatch`]; they carry every parameter the run
//! needs so the reconciler itself stays free of ambient state.

use chrono::{DateTime, Duration, Utc};

/// Which records a push covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// Every task and event in the local stores
    All,
    /// One record, addressed by local id
    Single(String),
}

/// Days around "now" that a pull fetches from the remote calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub past_days: u32,
    pub future_days: u32,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            past_days: 7,
            future_days: 30,
        }
    }
}

impl TimeWindow {
    pub fn new(past_days: u32, future_days: u32) -> Self {
        Self {
            past_days,
            future_days,
        }
    }

    /// Concrete (min, max) bounds around a reference instant
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            now - Duration::days(i64::from(self.past_days)),
            now + Duration::days(i64::from(self.future_days)),
        )
    }
}

/// One user-triggered reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Send local records to the remote calendar
    Push { scope: SyncScope },
    /// Import remote events not yet known locally
    Pull { window: TimeWindow },
}
