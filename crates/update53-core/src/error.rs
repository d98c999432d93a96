//! Error types for update53
//!
//! Every failure inside a cycle maps to one of these variants. Only
//! [`Error::Config`] raised at startup is fatal to the process; the daemon
//! logs everything else and carries on with the next tick.

use thiserror::Error;

/// Result type alias for update53 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for update53
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (bad hostname, conflicting options)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A candidate address that is not an IP literal
    #[error("{0}")]
    Validation(String),

    /// An address source or provider endpoint could not be reached
    #[error("Network error ({source_name}): {message}")]
    Network {
        /// Which source failed (URL, metadata endpoint, ...)
        source_name: String,
        /// Error message
        message: String,
    },

    /// No hosted zone matches the hostname
    #[error("{0}")]
    NotFound(String),

    /// The DNS provider rejected a request
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a network error tagged with the failing source
    pub fn network(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for errors that should stop the process at startup
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
