//! In-process notification rooms
//!
//! [`BroadcastHub`] plays the push server: one `tokio::sync::broadcast` room
//! per project id. Each [`HubChannel`] is one client connection. Events are
//! routed to the room of the event's project and delivered to every member
//! except the publisher.

use super::NotificationChannel;
use crate::error::ChannelError;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tasksync_model::{MutationEvent, ProjectId};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// An event tagged with the connection that published it
#[derive(Debug, Clone)]
struct Delivery {
    origin: u64,
    event: MutationEvent,
}

#[derive(Debug)]
struct Room {
    sender: broadcast::Sender<Delivery>,
    members: usize,
}

/// In-process push server
///
/// A room exists while at least one connection has joined it.
#[derive(Debug)]
pub struct BroadcastHub {
    rooms: DashMap<ProjectId, Room>,
    capacity: usize,
    next_client: AtomicU64,
}

impl BroadcastHub {
    /// Create hub; `capacity` is the per-room event buffer
    #[must_use]
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
            next_client: AtomicU64::new(1),
        })
    }

    /// Open a client connection
    #[must_use]
    pub fn connect(self: &Arc<Self>) -> HubChannel {
        let (inbound, _) = broadcast::channel(self.capacity);
        HubChannel {
            id: self.next_client.fetch_add(1, Ordering::Relaxed),
            hub: Arc::clone(self),
            inbound,
            joined: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of rooms with at least one member
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn enter(&self, project: &ProjectId) -> broadcast::Receiver<Delivery> {
        let mut room = self.rooms.entry(project.clone()).or_insert_with(|| Room {
            sender: broadcast::channel(self.capacity).0,
            members: 0,
        });
        room.members += 1;
        room.sender.subscribe()
    }

    fn exit(&self, project: &ProjectId) {
        if let Some(mut room) = self.rooms.get_mut(project) {
            room.members = room.members.saturating_sub(1);
        }
        if self.rooms.remove_if(project, |_, room| room.members == 0).is_some() {
            tracing::trace!(%project, "room emptied");
        }
    }

    fn route(&self, origin: u64, event: MutationEvent) {
        let Some(room) = self.rooms.get(event.project_id()).map(|r| r.sender.clone()) else {
            tracing::trace!(project = %event.project_id(), event = event.name(), "no room, event dropped");
            return;
        };
        // An empty room is not an error: nobody else is viewing the project.
        let _ = room.send(Delivery { origin, event });
    }
}

#[derive(Debug)]
struct Joined {
    project: ProjectId,
    forwarder: JoinHandle<()>,
}

/// One client connection to a [`BroadcastHub`]
#[derive(Debug)]
pub struct HubChannel {
    id: u64,
    hub: Arc<BroadcastHub>,
    inbound: broadcast::Sender<MutationEvent>,
    joined: Mutex<Option<Joined>>,
    closed: AtomicBool,
}

impl HubChannel {
    /// Room currently joined
    #[must_use]
    pub fn joined_project(&self) -> Option<ProjectId> {
        self.joined.lock().as_ref().map(|j| j.project.clone())
    }

    fn leave(&self) {
        let previous = self.joined.lock().take();
        if let Some(previous) = previous {
            previous.forwarder.abort();
            self.hub.exit(&previous.project);
        }
    }
}

#[async_trait]
impl NotificationChannel for HubChannel {
    async fn join(&self, project: &ProjectId) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.leave();

        let mut room = self.hub.enter(project);
        let inbound = self.inbound.clone();
        let me = self.id;
        let room_id = project.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match room.recv().await {
                    Ok(delivery) if delivery.origin != me => {
                        let _ = inbound.send(delivery.event);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(project = %room_id, skipped, "room lagged, events lost");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        *self.joined.lock() = Some(Joined {
            project: project.clone(),
            forwarder,
        });
        tracing::debug!(client = self.id, %project, "joined room");
        Ok(())
    }

    fn publish(&self, event: MutationEvent) {
        if self.is_closed() {
            tracing::debug!(client = self.id, event = event.name(), "channel closed, event dropped");
            return;
        }
        self.hub.route(self.id, event);
    }

    fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.inbound.subscribe()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.leave();
        tracing::debug!(client = self.id, "channel closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for HubChannel {
    fn drop(&mut self) {
        self.leave();
    }
}
