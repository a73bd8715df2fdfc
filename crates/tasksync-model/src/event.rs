//! Task mutation events exchanged over the notification channel
//!
//! On the wire each event is an envelope `{"event": <name>, "payload": <task>}`.
//! The payload is the full entity as returned by the server, so a peer never
//! needs to re-fetch to apply it.

use crate::ids::{ProjectId, TaskId};
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// The four event names, in the order the applier subscribes to them
pub const EVENT_NAMES: [&str; 4] = ["new task", "update task", "delete task", "change status"];

/// A task mutation originated by some client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum MutationEvent {
    /// A task was created
    #[serde(rename = "new task")]
    TaskCreated(Task),
    /// A task was edited
    #[serde(rename = "update task")]
    TaskUpdated(Task),
    /// A task was deleted
    #[serde(rename = "delete task")]
    TaskDeleted(Task),
    /// A task's completion status was toggled
    #[serde(rename = "change status")]
    TaskStatusChanged(Task),
}

/// An envelope could not be turned into a [`MutationEvent`]
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The event name is not one of [`EVENT_NAMES`]
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The payload is not a task
    #[error("malformed payload for {event}: {source}")]
    MalformedPayload {
        /// Event name
        event: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },
}

impl MutationEvent {
    /// Wire name of this event
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated(_) => EVENT_NAMES[0],
            Self::TaskUpdated(_) => EVENT_NAMES[1],
            Self::TaskDeleted(_) => EVENT_NAMES[2],
            Self::TaskStatusChanged(_) => EVENT_NAMES[3],
        }
    }

    /// The task carried by this event
    #[must_use]
    pub fn task(&self) -> &Task {
        match self {
            Self::TaskCreated(task)
            | Self::TaskUpdated(task)
            | Self::TaskDeleted(task)
            | Self::TaskStatusChanged(task) => task,
        }
    }

    /// Project the event belongs to
    #[inline]
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.task().project
    }

    /// Id of the task the event is about
    #[inline]
    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        &self.task().id
    }

    /// Build an event from a separately received name and payload
    ///
    /// # Errors
    /// [`EventError::UnknownEvent`] for names outside [`EVENT_NAMES`],
    /// [`EventError::MalformedPayload`] when the payload is not a task.
    pub fn from_parts(event: &str, payload: serde_json::Value) -> Result<Self, EventError> {
        let build: fn(Task) -> Self = match event {
            "new task" => Self::TaskCreated,
            "update task" => Self::TaskUpdated,
            "delete task" => Self::TaskDeleted,
            "change status" => Self::TaskStatusChanged,
            other => return Err(EventError::UnknownEvent(other.to_string())),
        };
        serde_json::from_value(payload)
            .map(build)
            .map_err(|source| EventError::MalformedPayload {
                event: event.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn task() -> Task {
        Task::new(
            TaskId::from("t1"),
            ProjectId::from("p1"),
            "Write brief",
            Priority::High,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn envelope_uses_event_and_payload_keys() {
        let value = serde_json::to_value(MutationEvent::TaskDeleted(task())).unwrap();

        assert_eq!(value["event"], "delete task");
        assert_eq!(value["payload"]["_id"], "t1");
    }

    #[test]
    fn names_match_wire_tags() {
        for event in [
            MutationEvent::TaskCreated(task()),
            MutationEvent::TaskUpdated(task()),
            MutationEvent::TaskDeleted(task()),
            MutationEvent::TaskStatusChanged(task()),
        ] {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn from_parts_rejects_unknown_names() {
        let payload = serde_json::to_value(task()).unwrap();
        assert!(matches!(
            MutationEvent::from_parts("open project", payload),
            Err(EventError::UnknownEvent(_))
        ));
    }

    #[test]
    fn from_parts_rejects_non_task_payloads() {
        let result = MutationEvent::from_parts("new task", serde_json::json!({"_id": "t1"}));
        assert!(matches!(result, Err(EventError::MalformedPayload { .. })));
    }

    #[test]
    fn from_parts_builds_matching_variant() {
        let payload = serde_json::to_value(task()).unwrap();
        let event = MutationEvent::from_parts("change status", payload).unwrap();

        assert_eq!(event, MutationEvent::TaskStatusChanged(task()));
        assert_eq!(event.project_id(), &ProjectId::from("p1"));
    }
}
