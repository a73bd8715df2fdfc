//! Error types for tasksync core
//!
//! Provides error handling for:
//! - Transport Client failures (missing credential, server rejections, network)
//! - Notification Channel failures
//! - Local form validation
//! - Configuration loading

use tasksync_model::ValidationError;

/// Main tasksync error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Request/response call failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Notification channel failed
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Form input failed local validation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The operation needs an entity bound to the open dialog
    #[error("no {0} bound to the open dialog")]
    NothingBound(&'static str),

    /// The operation needs an open project
    #[error("no project is open")]
    NoProjectOpen,
}

impl SyncError {
    /// Check if the failure is only a missing session credential
    #[inline]
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Transport(TransportError::MissingCredential))
    }

    /// Check if the error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Channel(ChannelError::Closed) => true,
            _ => false,
        }
    }
}

/// Transport Client errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No credential in the session; the request was not sent
    #[error("no session credential")]
    MissingCredential,

    /// The server answered with a non-success status
    #[error("server rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the server's `{message}` body
        message: String,
    },

    /// The request never produced a response
    #[error("network failure: {0}")]
    Network(String),

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Server-provided message, when the server answered
    #[inline]
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Message to surface in an error alert
    #[must_use]
    pub fn user_message(&self) -> String {
        self.server_message()
            .map_or_else(|| self.to_string(), str::to_string)
    }

    /// Check if the error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Notification Channel errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Could not connect to the push server
    #[error("connection failed: {0}")]
    Connect(String),

    /// The channel was closed (logout or server hang-up)
    #[error("channel closed")]
    Closed,

    /// A frame could not be encoded
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`SyncConfig`](crate::SyncConfig)
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_error_display() {
        let err = SyncError::NothingBound("task");
        assert!(err.to_string().contains("no task bound"));
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = TransportError::Rejected {
            status: 404,
            message: "Usuario no encontrado".to_string(),
        };
        assert_eq!(err.user_message(), "Usuario no encontrado");

        let err = TransportError::Network("connection refused".to_string());
        assert!(err.user_message().contains("connection refused"));
    }

    #[test]
    fn retryable_classification() {
        assert!(TransportError::Network("x".into()).is_retryable());
        assert!(TransportError::Rejected { status: 503, message: String::new() }.is_retryable());
        assert!(!TransportError::Rejected { status: 404, message: String::new() }.is_retryable());
        assert!(!TransportError::MissingCredential.is_retryable());

        assert!(SyncError::Channel(ChannelError::Closed).is_retryable());
        assert!(!SyncError::NoProjectOpen.is_retryable());
    }

    #[test]
    fn unauthenticated_detection() {
        let err: SyncError = TransportError::MissingCredential.into();
        assert!(err.is_unauthenticated());
    }
}
