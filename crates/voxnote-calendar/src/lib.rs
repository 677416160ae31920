//! Thin client for the remote calendar service.

pub mod client;
pub mod error;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use types::{Attendee, EventDateTime, EventListResponse, EventPayload, EventResource};
