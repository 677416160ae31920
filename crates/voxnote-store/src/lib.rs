//! JSON-backed local storage for tasks and events.
//!
//! Each collection is one document, loaded and saved whole. Records carry an
//! optional link to their remote calendar counterpart (`external_id`) plus a
//! `synced` flag; `synced == true` implies `external_id` is set.

pub mod document;
pub mod event;
pub mod task;

pub use document::StoreError;
pub use event::{Event, EventDocument, EventStore};
pub use task::{Priority, Task, TaskDocument, TaskStatus, TaskStore};
