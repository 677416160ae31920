use thiserror::Error;

/// Calendar API errors
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The bearer token was rejected (401)
    #[error("Authorization rejected")]
    Unauthorized,

    /// The account may not touch this calendar (403)
    #[error("Access to the calendar is forbidden")]
    Forbidden,

    /// No event with the given id exists remotely (404)
    #[error("Event not found: {0}")]
    NotFound(String),

    /// Rate limited by the API (429)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CalendarError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CalendarError::Unauthorized => {
                "Calendar authorization was rejected. Try again or re-authorize.".to_string()
            }
            CalendarError::Forbidden => {
                "This account is not allowed to modify the calendar.".to_string()
            }
            CalendarError::NotFound(_) => "The calendar event no longer exists.".to_string(),
            CalendarError::RateLimited(secs) => {
                format!("Too many requests. Wait {} seconds and retry.", secs)
            }
            CalendarError::Api { status, .. } => {
                format!("The calendar service returned an error ({}).", status)
            }
            CalendarError::Network(_) => {
                "Could not reach the calendar service. Check your connection.".to_string()
            }
        }
    }

    /// True when the bearer token was the problem and a refresh may help
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CalendarError::Unauthorized)
    }

    /// True when the referenced remote event does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CalendarError::NotFound(_))
    }

    /// True when retrying later without changes may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CalendarError::RateLimited(_) | CalendarError::Network(_) => true,
            CalendarError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
