//! Notification Channel
//!
//! Duplex, message-based connection to a server-side room keyed by project
//! id. Publishing is fire-and-forget; subscribers receive peer-originated
//! [`MutationEvent`]s in publish order.
//!
//! - [`BroadcastHub`] / [`HubChannel`]: in-process rooms, for embedding several
//!   clients in one process and for tests
//! - [`WsChannel`]: JSON text frames over a WebSocket to the push server

mod hub;
mod ws;

pub use hub::{BroadcastHub, HubChannel};
pub use ws::WsChannel;

use crate::error::ChannelError;
use async_trait::async_trait;
use tasksync_model::{MutationEvent, ProjectId};
use tokio::sync::broadcast;

/// Push connection shared by the Mutation Coordinator and the Remote Event Applier
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Join the room of `project`, leaving the previously joined room
    async fn join(&self, project: &ProjectId) -> Result<(), ChannelError>;

    /// Broadcast `event` to the other viewers of the event's project
    ///
    /// Never blocks and never reports delivery; a closed channel drops the event.
    fn publish(&self, event: MutationEvent);

    /// Receive events published by other clients in the joined room
    fn subscribe(&self) -> broadcast::Receiver<MutationEvent>;

    /// Close the connection; later publishes are dropped
    async fn close(&self);

    /// Whether [`close`](Self::close) has run or the server hung up
    fn is_closed(&self) -> bool;
}
