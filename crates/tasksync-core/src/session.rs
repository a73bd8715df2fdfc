//! Session wiring
//!
//! A [`SyncSession`] owns one Transport Client, one Notification Channel and
//! the coordinator built on them. The channel is connected once per session
//! and closed explicitly on logout.

use crate::channel::{NotificationChannel, WsChannel};
use crate::config::SyncConfig;
use crate::coordinator::MutationCoordinator;
use crate::credentials::Credentials;
use crate::error::SyncError;
use crate::navigation::Navigator;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;

/// One signed-in client
pub struct SyncSession {
    coordinator: Arc<MutationCoordinator>,
    channel: Arc<dyn NotificationChannel>,
    credentials: Credentials,
}

impl SyncSession {
    /// Connect to the servers named in `config`
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the HTTP client cannot be built,
    /// [`SyncError::Channel`] if the push server is unreachable.
    pub async fn connect(
        config: SyncConfig,
        credentials: Credentials,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SyncError> {
        let transport = HttpTransport::from_config(&config, credentials.clone())?;
        let channel = WsChannel::connect(&config.socket_url, config.channel_capacity).await?;
        Ok(Self::with_parts(
            Arc::new(transport),
            Arc::new(channel),
            navigator,
            credentials,
            config,
        ))
    }

    /// Assemble a session from existing parts
    ///
    /// `credentials` must be the handle `transport` reads its token from.
    #[must_use]
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        channel: Arc<dyn NotificationChannel>,
        navigator: Arc<dyn Navigator>,
        credentials: Credentials,
        config: SyncConfig,
    ) -> Self {
        let coordinator =
            MutationCoordinator::new(transport, Arc::clone(&channel), navigator, config);
        Self {
            coordinator: Arc::new(coordinator),
            channel,
            credentials,
        }
    }

    /// Coordinator for this session
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &Arc<MutationCoordinator> {
        &self.coordinator
    }

    /// Credential handle shared with the transport
    #[inline]
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Notification Channel for this session
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &Arc<dyn NotificationChannel> {
        &self.channel
    }

    /// Store a fresh token and load the projects list
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the projects list cannot be loaded.
    pub async fn login(&self, token: impl Into<String>) -> Result<(), SyncError> {
        self.credentials.set(token);
        tracing::info!("session credential refreshed");
        self.coordinator.load_projects().await
    }

    /// Clear session state, drop the credential and close the channel
    pub async fn logout(&self) {
        self.coordinator.logout_session_projects();
        self.credentials.clear();
        self.channel.close().await;
        tracing::info!("logged out");
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("coordinator", &self.coordinator)
            .field("credentials", &self.credentials)
            .field("channel_closed", &self.channel.is_closed())
            .finish()
    }
}
