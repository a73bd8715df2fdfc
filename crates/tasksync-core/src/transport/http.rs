//! REST implementation of [`Transport`] on `reqwest`

use super::Transport;
use crate::config::SyncConfig;
use crate::credentials::Credentials;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tasksync_model::{
    Collaborator, Project, ProjectDraft, ProjectId, ProjectSummary, Task, TaskDraft, TaskId,
    UserId,
};

/// `{ "data": ... }` response body
#[derive(Debug, Deserialize)]
struct Data<T> {
    data: T,
}

/// `{ "message": ... }` response body (confirmations and errors)
#[derive(Debug, Deserialize)]
struct Message {
    message: String,
}

/// Body of `GET /projects/:id`
#[derive(Debug, Deserialize)]
struct OpenProject {
    #[serde(rename = "existsProject")]
    project: Project,
}

/// Transport Client over HTTP
///
/// Reads the bearer token from the injected [`Credentials`] on every call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Create transport for the API rooted at `base_url`
    ///
    /// # Errors
    /// [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials,
        })
    }

    /// Create transport from configuration
    ///
    /// # Errors
    /// See [`HttpTransport::new`].
    pub fn from_config(config: &SyncConfig, credentials: Credentials) -> Result<Self, TransportError> {
        Self::new(config.api_url.clone(), credentials, config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, TransportError> {
        let Some(token) = self.credentials.bearer() else {
            tracing::debug!(%method, path, "no credential, request not sent");
            return Err(TransportError::MissingCredential);
        };

        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = rejection_message(status, &text);
            tracing::debug!(%method, path, status = status.as_u16(), %message, "request rejected");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::Decode(format!("{method} {path}: {e}")))
    }
}

/// Message from a `{message}` error body, or the status reason
fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Message>(body).map_or_else(
        |_| status.canonical_reason().unwrap_or("request failed").to_string(),
        |m| m.message,
    )
}

fn encode(value: &impl Serialize) -> Result<Value, TransportError> {
    serde_json::to_value(value).map_err(|e| TransportError::Decode(format!("encode: {e}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TransportError> {
        let body: Data<Vec<ProjectSummary>> = self.call(Method::GET, "projects", None).await?;
        Ok(body.data)
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Project, TransportError> {
        let body: Data<OpenProject> = self
            .call(Method::GET, &format!("projects/{id}"), None)
            .await?;
        Ok(body.data.project)
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<ProjectSummary, TransportError> {
        let body: Data<ProjectSummary> = self
            .call(Method::POST, "projects", Some(encode(draft)?))
            .await?;
        Ok(body.data)
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        draft: &ProjectDraft,
    ) -> Result<ProjectSummary, TransportError> {
        let body: Data<ProjectSummary> = self
            .call(Method::PUT, &format!("projects/{id}"), Some(encode(draft)?))
            .await?;
        Ok(body.data)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<String, TransportError> {
        let body: Message = self
            .call(Method::DELETE, &format!("projects/{id}"), None)
            .await?;
        Ok(body.message)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, TransportError> {
        let body: Data<Task> = self
            .call(Method::POST, "tasks", Some(encode(draft)?))
            .await?;
        Ok(body.data)
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, TransportError> {
        let body: Data<Task> = self
            .call(Method::PUT, &format!("tasks/{id}"), Some(encode(draft)?))
            .await?;
        Ok(body.data)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<String, TransportError> {
        let body: Message = self
            .call(Method::DELETE, &format!("tasks/{id}"), None)
            .await?;
        Ok(body.message)
    }

    async fn toggle_task_status(&self, id: &TaskId) -> Result<Task, TransportError> {
        self.call(Method::POST, &format!("tasks/status/{id}"), Some(json!({})))
            .await
    }

    async fn find_collaborator(&self, email: &str) -> Result<Collaborator, TransportError> {
        self.call(
            Method::POST,
            "projects/collaborators",
            Some(json!({ "email": email })),
        )
        .await
    }

    async fn add_collaborator(
        &self,
        project: &ProjectId,
        email: &str,
    ) -> Result<String, TransportError> {
        let body: Message = self
            .call(
                Method::POST,
                &format!("projects/collaborators/{project}"),
                Some(json!({ "email": email })),
            )
            .await?;
        Ok(body.message)
    }

    async fn remove_collaborator(
        &self,
        project: &ProjectId,
        collaborator: &UserId,
    ) -> Result<String, TransportError> {
        let body: Message = self
            .call(
                Method::POST,
                &format!("projects/delete-collaborator/{project}"),
                Some(json!({ "id": collaborator })),
            )
            .await?;
        Ok(body.message)
    }
}
