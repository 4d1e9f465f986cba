//! Error types for zone synchronization
//!
//! This module defines all error types used throughout the crate.
//!
//! Only two conditions stop a run outright: [`Error::InvalidInput`] for a
//! malformed instruction payload and [`Error::Authentication`] when the
//! provider session cannot be opened. Everything else is reported per zone or
//! per record and the run carries on.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zone synchronization
#[derive(Error, Debug)]
pub enum Error {
    /// The instruction payload could not be used at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credentials are missing or the provider rejected them
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The declared zone does not exist on the provider
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// HTTP transport errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Undecodable JSON in a provider reply
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (reading the instruction stream)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
