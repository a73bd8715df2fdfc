//! tasksync core - collaborative state reconciliation
//!
//! Owns the in-memory view of the open project and merges mutations from two
//! sources into it:
//! - responses to locally initiated requests ([`MutationCoordinator`])
//! - notifications published by other clients viewing the same project
//!   ([`RemoteEventApplier`])
//!
//! Both paths go through the same merge primitives in [`store::merge`], so a
//! change looks the same whether it was made here or by a peer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasksync_core::{Credentials, RouteTracker, SyncConfig, SyncSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::load("tasksync.toml")?;
//! let session = SyncSession::connect(config, Credentials::anonymous(), Arc::new(RouteTracker::new())).await?;
//!
//! session.login("token").await?;
//! let coordinator = session.coordinator();
//! coordinator.get_one_project(&"p1".into()).await?;
//!
//! println!("{} tasks", coordinator.snapshot().project.map_or(0, |p| p.tasks.len()));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod applier;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod dialog;
pub mod error;
pub mod navigation;
pub mod session;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use applier::RemoteEventApplier;
pub use channel::{BroadcastHub, HubChannel, NotificationChannel, WsChannel};
pub use config::{AlertWindows, SyncConfig};
pub use coordinator::{MutationCoordinator, ViewSnapshot};
pub use credentials::Credentials;
pub use dialog::{Dialog, DialogStore};
pub use error::{ChannelError, ConfigError, SyncError, TransportError};
pub use navigation::{Navigator, Route, RouteTracker};
pub use session::SyncSession;
pub use store::{AlertStore, ProjectSnapshot, ProjectStore};
pub use transport::{HttpTransport, Transport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with tasksync core
    pub use crate::{
        Credentials, Dialog, MutationCoordinator, NotificationChannel, Route, SyncConfig,
        SyncError, SyncSession, Transport,
    };
    pub use tasksync_model::{
        Alert, Collaborator, MutationEvent, Priority, Project, ProjectDraft, ProjectId, Task,
        TaskDraft, TaskId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
