//! tasksync Model
//!
//! Domain and wire types shared by every tasksync crate.
//!
//! # Core Concepts
//!
//! - [`Project`]: The open project, loaded wholesale with its tasks and collaborators
//! - [`ProjectSummary`]: A project as listed on the projects page
//! - [`Task`]: A persisted task; identity is its [`TaskId`]
//! - [`TaskDraft`] / [`ProjectDraft`]: Form input, create vs. update decided by the id
//! - [`Collaborator`]: A user sharing a project
//! - [`Alert`]: Transient user-facing message
//! - [`MutationEvent`]: Task mutation broadcast to the other viewers of a project
//!
//! # Example
//!
//! ```rust
//! use tasksync_model::{MutationEvent, Priority, ProjectId, Task, TaskId};
//! use chrono::NaiveDate;
//!
//! let task = Task::new(
//!     TaskId::from("t1"),
//!     ProjectId::from("p1"),
//!     "Write brief",
//!     Priority::High,
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! );
//! let event = MutationEvent::TaskCreated(task);
//! assert_eq!(event.name(), "new task");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod alert;
mod collaborator;
mod date;
mod event;
mod ids;
mod project;
mod task;
mod validation;

// Re-exports
pub use alert::Alert;
pub use collaborator::Collaborator;
pub use event::{EventError, MutationEvent, EVENT_NAMES};
pub use ids::{ProjectId, TaskId, UserId};
pub use project::{Project, ProjectDraft, ProjectSummary};
pub use task::{Priority, Task, TaskDraft};
pub use validation::ValidationError;

/// Date (de)serialization helpers for `YYYY-MM-DD` and ISO datetime inputs
pub mod serde_date {
    pub use crate::date::{deserialize, option, parse_date, serialize};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
