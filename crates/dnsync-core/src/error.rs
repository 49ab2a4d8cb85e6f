//! Error types for dnsync
//!
//! The variants follow the failure taxonomy of the client: configuration
//! errors are fatal at startup, discovery and resolution errors are absorbed
//! by the layer that sees them, provider and webhook errors abort the current
//! sync, and worker faults travel to the supervisor.

use thiserror::Error;

/// Result type alias for dnsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsync
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Current address could not be discovered
    #[error("Address discovery error: {0}")]
    Discovery(String),

    /// Published record could not be resolved
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Webhook execution failed
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// Notification delivery failed
    #[error("Notification error ({channel}): {message}")]
    Notification {
        /// Channel name
        channel: String,
        /// Error message
        message: String,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Record or zone not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A worker panicked while running in run-once mode
    #[error("Worker for {domain} crashed: {message}")]
    WorkerFault {
        /// Domain the worker was responsible for
        domain: String,
        /// Panic message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an address discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a webhook error
    pub fn webhook(msg: impl Into<String>) -> Self {
        Self::Webhook(msg.into())
    }

    /// Create a notification error
    pub fn notification(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
