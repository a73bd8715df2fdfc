//! In-memory persistence server

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tasksync_core::{Credentials, Transport, TransportError};
use tasksync_model::{
    Collaborator, Project, ProjectDraft, ProjectId, ProjectSummary, Task, TaskDraft, TaskId,
    UserId,
};

/// Message the server answers unknown collaborator emails with
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";

#[derive(Debug, Default)]
struct ServerState {
    projects: Vec<Project>,
    users: Vec<Collaborator>,
    next_id: u64,
    calls: Vec<&'static str>,
    fail_next: Option<TransportError>,
}

impl ServerState {
    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }

    fn project_mut(&mut self, id: &ProjectId) -> Result<&mut Project, TransportError> {
        self.projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| rejected(404, "Project not found"))
    }

    fn task_mut(&mut self, id: &TaskId) -> Result<&mut Task, TransportError> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.tasks.iter_mut())
            .find(|t| &t.id == id)
            .ok_or_else(|| rejected(404, "Task not found"))
    }

    fn user(&self, email: &str) -> Result<Collaborator, TransportError> {
        self.users
            .iter()
            .find(|u| u.has_email(email))
            .cloned()
            .ok_or_else(|| rejected(404, USER_NOT_FOUND))
    }
}

fn rejected(status: u16, message: &str) -> TransportError {
    TransportError::Rejected {
        status,
        message: message.to_string(),
    }
}

/// Shared server state; hand out one [`FakeTransport`] per client
#[derive(Debug, Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    /// Create empty server
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project
    pub fn with_project(self, project: Project) -> Self {
        self.state.lock().projects.push(project);
        self
    }

    /// Register a user that collaborator lookups can find
    pub fn with_user(self, user: Collaborator) -> Self {
        self.state.lock().users.push(user);
        self
    }

    /// Client connection authenticated by `credentials`
    pub fn client(&self, credentials: Credentials) -> FakeTransport {
        FakeTransport {
            server: self.clone(),
            credentials,
        }
    }

    /// Fail the next request that reaches the server with `error`
    pub fn fail_next(&self, error: TransportError) {
        self.state.lock().fail_next = Some(error);
    }

    /// Server-side copy of a project
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.state.lock().projects.iter().find(|p| &p.id == id).cloned()
    }

    /// Names of the operations that reached the server, oldest first
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }
}

/// One client's [`Transport`] into a [`FakeServer`]
#[derive(Debug, Clone)]
pub struct FakeTransport {
    server: FakeServer,
    credentials: Credentials,
}

impl FakeTransport {
    /// Server this transport talks to
    pub fn server(&self) -> &FakeServer {
        &self.server
    }

    /// Run `operation` against the server state the way a real request would
    fn request<T>(
        &self,
        name: &'static str,
        operation: impl FnOnce(&mut ServerState) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        if !self.credentials.is_authenticated() {
            return Err(TransportError::MissingCredential);
        }
        let mut state = self.server.state.lock();
        state.calls.push(name);
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        operation(&mut state)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TransportError> {
        self.request("list_projects", |state| {
            Ok(state.projects.iter().map(Project::summary).collect())
        })
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Project, TransportError> {
        self.request("get_project", |state| state.project_mut(id).map(|p| p.clone()))
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<ProjectSummary, TransportError> {
        self.request("create_project", |state| {
            let id = ProjectId::new(state.next_id("project"));
            let mut project = Project::new(id, draft.name.clone(), UserId::from("owner"));
            project.description.clone_from(&draft.description);
            project.client.clone_from(&draft.client);
            project.date_delivery = draft.date_delivery;
            let summary = project.summary();
            state.projects.push(project);
            Ok(summary)
        })
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        draft: &ProjectDraft,
    ) -> Result<ProjectSummary, TransportError> {
        self.request("update_project", |state| {
            let project = state.project_mut(id)?;
            project.name.clone_from(&draft.name);
            project.description.clone_from(&draft.description);
            project.client.clone_from(&draft.client);
            project.date_delivery = draft.date_delivery;
            Ok(project.summary())
        })
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<String, TransportError> {
        self.request("delete_project", |state| {
            state.project_mut(id)?;
            state.projects.retain(|p| &p.id != id);
            Ok("Project deleted".to_string())
        })
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, TransportError> {
        self.request("create_task", |state| {
            let id = TaskId::new(state.next_id("task"));
            let (Some(priority), Some(date)) = (draft.priority, draft.date_delivery) else {
                return Err(rejected(400, "All fields are required"));
            };
            let task = Task::new(id, draft.project.clone(), draft.name.clone(), priority, date)
                .with_description(draft.description.clone());
            state.project_mut(&draft.project)?.tasks.push(task.clone());
            Ok(task)
        })
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, TransportError> {
        self.request("update_task", |state| {
            let task = state.task_mut(id)?;
            task.name.clone_from(&draft.name);
            task.description.clone_from(&draft.description);
            if let Some(priority) = draft.priority {
                task.priority = priority;
            }
            if let Some(date) = draft.date_delivery {
                task.date_delivery = date;
            }
            Ok(task.clone())
        })
    }

    async fn delete_task(&self, id: &TaskId) -> Result<String, TransportError> {
        self.request("delete_task", |state| {
            state.task_mut(id)?;
            for project in &mut state.projects {
                project.tasks.retain(|t| &t.id != id);
            }
            Ok("Task deleted".to_string())
        })
    }

    async fn toggle_task_status(&self, id: &TaskId) -> Result<Task, TransportError> {
        self.request("toggle_task_status", |state| {
            let task = state.task_mut(id)?;
            task.completed = !task.completed;
            Ok(task.clone())
        })
    }

    async fn find_collaborator(&self, email: &str) -> Result<Collaborator, TransportError> {
        self.request("find_collaborator", |state| state.user(email))
    }

    async fn add_collaborator(
        &self,
        project: &ProjectId,
        email: &str,
    ) -> Result<String, TransportError> {
        self.request("add_collaborator", |state| {
            let user = state.user(email)?;
            let project = state.project_mut(project)?;
            if project.has_collaborator(&user.id) {
                return Err(rejected(400, "The collaborator already belongs to the project"));
            }
            project.collaborators.push(user);
            Ok("Collaborator added successfully".to_string())
        })
    }

    async fn remove_collaborator(
        &self,
        project: &ProjectId,
        collaborator: &UserId,
    ) -> Result<String, TransportError> {
        self.request("remove_collaborator", |state| {
            let project = state.project_mut(project)?;
            project.collaborators.retain(|c| &c.id != collaborator);
            Ok("Collaborator removed successfully".to_string())
        })
    }
}
