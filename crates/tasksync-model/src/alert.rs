//! Transient user-facing alerts

use serde::{Deserialize, Serialize};

/// A transient message with a severity flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Message text
    pub message: String,
    /// Whether this reports a failure
    #[serde(rename = "error")]
    pub is_error: bool,
}

impl Alert {
    /// Success alert
    #[inline]
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    /// Error alert
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}
