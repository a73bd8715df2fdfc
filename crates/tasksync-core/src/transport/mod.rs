//! Transport Client
//!
//! Authenticated request/response calls to the persistence server. The
//! [`Transport`] trait is the seam the Mutation Coordinator talks to;
//! [`HttpTransport`] is the REST implementation.
//!
//! Every implementation must short-circuit with
//! [`TransportError::MissingCredential`] when the session has no credential,
//! without sending anything.

mod http;

pub use http::HttpTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use tasksync_model::{
    Collaborator, Project, ProjectDraft, ProjectId, ProjectSummary, Task, TaskDraft, TaskId,
    UserId,
};

/// Request/response calls to the persistence server
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET /projects`
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TransportError>;

    /// `GET /projects/:id`, with tasks and collaborators
    async fn get_project(&self, id: &ProjectId) -> Result<Project, TransportError>;

    /// `POST /projects`
    async fn create_project(&self, draft: &ProjectDraft) -> Result<ProjectSummary, TransportError>;

    /// `PUT /projects/:id`
    async fn update_project(
        &self,
        id: &ProjectId,
        draft: &ProjectDraft,
    ) -> Result<ProjectSummary, TransportError>;

    /// `DELETE /projects/:id`; returns the server's confirmation message
    async fn delete_project(&self, id: &ProjectId) -> Result<String, TransportError>;

    /// `POST /tasks`
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, TransportError>;

    /// `PUT /tasks/:id`
    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, TransportError>;

    /// `DELETE /tasks/:id`; returns the server's confirmation message
    async fn delete_task(&self, id: &TaskId) -> Result<String, TransportError>;

    /// `POST /tasks/status/:id`; returns the task with its toggled status
    async fn toggle_task_status(&self, id: &TaskId) -> Result<Task, TransportError>;

    /// `POST /projects/collaborators`; resolves an email to a user
    async fn find_collaborator(&self, email: &str) -> Result<Collaborator, TransportError>;

    /// `POST /projects/collaborators/:id`; returns the server's confirmation message
    async fn add_collaborator(
        &self,
        project: &ProjectId,
        email: &str,
    ) -> Result<String, TransportError>;

    /// `POST /projects/delete-collaborator/:id`; returns the server's confirmation message
    async fn remove_collaborator(
        &self,
        project: &ProjectId,
        collaborator: &UserId,
    ) -> Result<String, TransportError>;
}
