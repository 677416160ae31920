//! Credential handling and OAuth2 token lifecycle for the calendar provider.

pub mod credentials;
pub mod error;
pub mod oauth;
pub mod token;

pub use credentials::Credential;
pub use error::AuthError;
pub use oauth::{OAuthProvider, TokenResponse, OOB_REDIRECT};
pub use token::TokenManager;
