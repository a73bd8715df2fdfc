//! Session configuration
//!
//! Loaded from TOML with environment overrides for the two server addresses.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`SyncConfig::api_url`]
pub const ENV_API_URL: &str = "TASKSYNC_API_URL";
/// Environment variable overriding [`SyncConfig::socket_url`]
pub const ENV_SOCKET_URL: &str = "TASKSYNC_SOCKET_URL";

/// tasksync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the REST API (e.g. `http://localhost:4000/api`)
    pub api_url: String,
    /// WebSocket address of the push server
    pub socket_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Buffered events per notification subscriber
    pub channel_capacity: usize,
    /// Show write failures as error alerts instead of only logging them
    pub surface_write_errors: bool,
    /// Alert display windows
    pub alerts: AlertWindows,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With REST API base URL
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// With push server address
    #[inline]
    #[must_use]
    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = url.into();
        self
    }

    /// With write-error surfacing
    #[inline]
    #[must_use]
    pub fn with_surface_write_errors(mut self, surface: bool) -> Self {
        self.surface_write_errors = surface;
        self
    }

    /// With alert windows
    #[inline]
    #[must_use]
    pub fn with_alerts(mut self, alerts: AlertWindows) -> Self {
        self.alerts = alerts;
        self
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse TOML; missing keys take their defaults
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on invalid TOML or mistyped values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read a TOML file and apply environment overrides
    ///
    /// # Errors
    /// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?.with_env_overrides();
        tracing::debug!(path = %path.display(), api_url = %config.api_url, "configuration loaded");
        Ok(config)
    }

    /// Apply `TASKSYNC_API_URL` / `TASKSYNC_SOCKET_URL` when set
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(url) = lookup(ENV_SOCKET_URL).filter(|v| !v.is_empty()) {
            self.socket_url = url;
        }
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4000/api".to_string(),
            socket_url: "ws://localhost:4000".to_string(),
            request_timeout_secs: 30,
            channel_capacity: 256,
            surface_write_errors: false,
            alerts: AlertWindows::default(),
        }
    }
}

/// How long each kind of alert stays visible, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertWindows {
    /// Generic alerts, including local validation
    pub generic_ms: u64,
    /// Failure to open a project
    pub read_error_ms: u64,
    /// Project saved/deleted, followed by navigation to the list
    pub project_redirect_ms: u64,
    /// Task deleted
    pub task_delete_ms: u64,
    /// Collaborator lookup/add/remove outcomes
    pub collaborator_ms: u64,
}

impl AlertWindows {
    /// Generic window
    #[inline]
    #[must_use]
    pub fn generic(&self) -> Duration {
        Duration::from_millis(self.generic_ms)
    }

    /// Read-error window
    #[inline]
    #[must_use]
    pub fn read_error(&self) -> Duration {
        Duration::from_millis(self.read_error_ms)
    }

    /// Project redirect window
    #[inline]
    #[must_use]
    pub fn project_redirect(&self) -> Duration {
        Duration::from_millis(self.project_redirect_ms)
    }

    /// Task delete window
    #[inline]
    #[must_use]
    pub fn task_delete(&self) -> Duration {
        Duration::from_millis(self.task_delete_ms)
    }

    /// Collaborator window
    #[inline]
    #[must_use]
    pub fn collaborator(&self) -> Duration {
        Duration::from_millis(self.collaborator_ms)
    }
}

impl Default for AlertWindows {
    fn default() -> Self {
        Self {
            generic_ms: 2000,
            read_error_ms: 3000,
            project_redirect_ms: 1000,
            task_delete_ms: 2000,
            collaborator_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.alerts.generic(), Duration::from_millis(2000));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.surface_write_errors);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str(
            r#"
            api_url = "https://tracker.example.com/api"
            surface_write_errors = true

            [alerts]
            generic_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, "https://tracker.example.com/api");
        assert_eq!(config.socket_url, "ws://localhost:4000");
        assert!(config.surface_write_errors);
        assert_eq!(config.alerts.generic_ms, 500);
        assert_eq!(config.alerts.read_error_ms, 3000);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let result = SyncConfig::from_toml_str("channel_capacity = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn overrides_replace_urls() {
        let config = SyncConfig::new().with_overrides(|key| match key {
            ENV_API_URL => Some("http://api".to_string()),
            ENV_SOCKET_URL => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.api_url, "http://api");
        assert_eq!(config.socket_url, "ws://localhost:4000");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SyncConfig::load("/nonexistent/tasksync.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tasksync.toml"));
    }
}
