//! WebSocket Notification Channel
//!
//! Frames are JSON text messages `{"event": <name>, "payload": <value>}`.
//! Joining a room sends `"open project"` with the project id; the server
//! relays mutation events to the other members of the room.
//!
//! This is plain WebSocket framing, not the socket.io protocol (no Engine.IO
//! handshake, no `42[...]` packet prefix). A socket.io push server needs a
//! relay in front of it that speaks these frames; otherwise use
//! [`HubChannel`](super::HubChannel) or another [`NotificationChannel`].

use super::NotificationChannel;
use crate::error::ChannelError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tasksync_model::{EventError, MutationEvent, ProjectId};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Room control frames
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "payload")]
enum Control {
    #[serde(rename = "open project")]
    OpenProject(ProjectId),
}

/// Anything the client writes
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outbound {
    Control(Control),
    Mutation(MutationEvent),
}

#[derive(Debug)]
enum Command {
    Send(Outbound),
    Close,
}

/// Inbound envelope before the event name is checked
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Notification Channel over a WebSocket connection
///
/// Connected once per session. A writer task drains an unbounded queue so
/// [`publish`](NotificationChannel::publish) never waits; a reader task fans
/// decoded events out to subscribers.
#[derive(Debug)]
pub struct WsChannel {
    url: String,
    commands: mpsc::UnboundedSender<Command>,
    inbound: broadcast::Sender<MutationEvent>,
    closed: Arc<AtomicBool>,
    writer: Mutex<Option<JoinHandle<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WsChannel {
    /// Connect to the push server at `url`
    ///
    /// # Errors
    /// [`ChannelError::Connect`] if the WebSocket handshake fails.
    pub async fn connect(url: &str, capacity: usize) -> Result<Self, ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(format!("{url}: {e}")))?;
        let (mut sink, mut source) = stream.split();
        let (commands, mut queue) = mpsc::unbounded_channel::<Command>();
        let (inbound, _) = broadcast::channel(capacity.max(1));
        let closed = Arc::new(AtomicBool::new(false));

        let writer_closed = Arc::clone(&closed);
        let writer = tokio::spawn(async move {
            while let Some(command) = queue.recv().await {
                let frame = match command {
                    Command::Send(frame) => frame,
                    Command::Close => {
                        let _ = sink.send(Message::Close(None)).await;
                        let _ = sink.close().await;
                        break;
                    }
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "frame not encodable, dropped");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::warn!(error = %e, "push server write failed");
                    break;
                }
            }
            writer_closed.store(true, Ordering::SeqCst);
        });

        let reader_inbound = inbound.clone();
        let reader_closed = Arc::clone(&closed);
        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = decode_frame(&text) {
                            let _ = reader_inbound.send(event);
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "push server read failed");
                        break;
                    }
                }
            }
            reader_closed.store(true, Ordering::SeqCst);
            tracing::debug!("push server connection ended");
        });

        tracing::info!(url, "connected to push server");
        Ok(Self {
            url: url.to_string(),
            commands,
            inbound,
            closed,
            writer: Mutex::new(Some(writer)),
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Address this channel is connected to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, frame: Outbound) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.commands.send(Command::Send(frame)).map_err(|_| {
            self.closed.store(true, Ordering::SeqCst);
            ChannelError::Closed
        })
    }
}

/// Decode a text frame; non-mutation events are skipped
fn decode_frame(text: &str) -> Option<MutationEvent> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable frame skipped");
            return None;
        }
    };
    match MutationEvent::from_parts(&envelope.event, envelope.payload) {
        Ok(event) => Some(event),
        Err(EventError::UnknownEvent(name)) => {
            tracing::trace!(event = %name, "unsubscribed event skipped");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed event skipped");
            None
        }
    }
}

#[async_trait]
impl NotificationChannel for WsChannel {
    async fn join(&self, project: &ProjectId) -> Result<(), ChannelError> {
        self.send(Outbound::Control(Control::OpenProject(project.clone())))?;
        tracing::debug!(%project, "joined room");
        Ok(())
    }

    fn publish(&self, event: MutationEvent) {
        let name = event.name();
        if let Err(e) = self.send(Outbound::Mutation(event)) {
            tracing::debug!(event = name, error = %e, "event dropped");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.inbound.subscribe()
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.send(Command::Close);
        let writer = self.writer.lock().take();
        if let Some(writer) = writer {
            let _ = writer.await;
        }
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
        tracing::info!(url = %self.url, "push server connection closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().take() {
            writer.abort();
        }
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}
