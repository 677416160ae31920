//! Reconciliation between the local task/event stores and the remote
//! calendar.
//!
//! All retry and recovery policy lives here. The auth and calendar crates
//! fail fast without retrying; the [`Reconciler`] decides what each failure
//! means for the batch it is running.

pub mod command;
pub mod payload;
pub mod reconciler;
pub mod report;

pub use command::{SyncCommand, SyncScope, TimeWindow};
pub use reconciler::{Reconciler, SyncError};
pub use report::{FailureKind, SyncFailure, SyncReport};
