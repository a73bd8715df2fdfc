//! Client-side stores
//!
//! - [`ProjectStore`]: the open project and the projects list
//! - [`AlertStore`]: the single transient alert
//! - [`merge`]: pure merge primitives shared by local and remote paths

pub mod merge;
mod alert;
mod project;

pub use alert::AlertStore;
pub use project::{ProjectSnapshot, ProjectStore};
