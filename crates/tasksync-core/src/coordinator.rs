//! Mutation Coordinator
//!
//! Caller-facing entry points. Each operation validates locally, performs one
//! Transport call, and on success updates the stores through the same merge
//! primitives the Remote Event Applier uses, then publishes the matching
//! mutation event so other viewers converge.
//!
//! Failure handling:
//! - a missing credential short-circuits the call and is logged at debug level
//! - read failures (opening a project, collaborator lookup/add) show the
//!   server's message as an error alert
//! - write failures are logged and returned; they only raise an alert when
//!   [`SyncConfig::surface_write_errors`] is set
//! - local validation failures raise an error alert before any request

use crate::applier::RemoteEventApplier;
use crate::channel::NotificationChannel;
use crate::config::SyncConfig;
use crate::dialog::{Dialog, DialogStore};
use crate::error::{SyncError, TransportError};
use crate::navigation::{Navigator, Route};
use crate::store::{AlertStore, ProjectSnapshot, ProjectStore};
use crate::transport::Transport;
use std::sync::Arc;
use tasksync_model::{
    Alert, Collaborator, MutationEvent, ProjectDraft, ProjectId, ProjectSummary, Task, TaskDraft,
    TaskId, ValidationError,
};
use tokio::sync::watch;

/// Read-only view of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Projects list
    pub projects: Arc<Vec<ProjectSummary>>,
    /// Open project
    pub project: ProjectSnapshot,
    /// Live alert
    pub alert: Option<Alert>,
    /// A read is in flight
    pub loading: bool,
    /// Open dialog and its bound entity
    pub dialog: Dialog,
    /// Collaborator found by email, waiting to be added
    pub candidate: Option<Collaborator>,
    /// Search dialog is visible
    pub search: bool,
}

/// Orchestrates local mutations against the server and the stores
pub struct MutationCoordinator {
    transport: Arc<dyn Transport>,
    channel: Arc<dyn NotificationChannel>,
    navigator: Arc<dyn Navigator>,
    projects: Arc<ProjectStore>,
    alerts: AlertStore,
    dialog: DialogStore,
    candidate: watch::Sender<Option<Collaborator>>,
    applier: RemoteEventApplier,
    config: SyncConfig,
}

impl MutationCoordinator {
    /// Create coordinator with empty stores
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        channel: Arc<dyn NotificationChannel>,
        navigator: Arc<dyn Navigator>,
        config: SyncConfig,
    ) -> Self {
        let projects = Arc::new(ProjectStore::new());
        let applier = RemoteEventApplier::new(Arc::clone(&channel), Arc::clone(&projects));
        Self {
            transport,
            channel,
            navigator,
            projects,
            alerts: AlertStore::new(config.alerts.generic()),
            dialog: DialogStore::new(),
            candidate: watch::channel(None).0,
            applier,
            config,
        }
    }

    /// Project Store
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &Arc<ProjectStore> {
        &self.projects
    }

    /// Alert Store
    #[inline]
    #[must_use]
    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    /// Dialog state
    #[inline]
    #[must_use]
    pub fn dialog(&self) -> &DialogStore {
        &self.dialog
    }

    /// Remote Event Applier bound to the Project Store
    #[inline]
    #[must_use]
    pub fn applier(&self) -> &RemoteEventApplier {
        &self.applier
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Collaborator candidate found by [`submit_collaborator`](Self::submit_collaborator)
    #[must_use]
    pub fn candidate(&self) -> Option<Collaborator> {
        self.candidate.borrow().clone()
    }

    /// Observe the collaborator candidate
    #[must_use]
    pub fn watch_candidate(&self) -> watch::Receiver<Option<Collaborator>> {
        self.candidate.subscribe()
    }

    /// Everything the presentation layer renders, in one read
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            projects: self.projects.projects(),
            project: self.projects.project(),
            alert: self.alerts.current(),
            loading: self.projects.is_loading(),
            dialog: self.dialog.current(),
            candidate: self.candidate(),
            search: self.dialog.search_visible(),
        }
    }

    /// Show `alert` for the generic window
    pub fn show_alert(&self, alert: Alert) {
        self.alerts.show(alert);
    }

    /// Fetch the projects list
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the list cannot be fetched; the list is
    /// left as it was.
    pub async fn load_projects(&self) -> Result<(), SyncError> {
        let projects = self
            .transport
            .list_projects()
            .await
            .map_err(|e| self.request_failed("load_projects", e))?;
        tracing::info!(count = projects.len(), "projects loaded");
        self.projects.set_projects(projects);
        Ok(())
    }

    /// Open a project and follow its notification room
    ///
    /// On failure the user is sent back to the projects list with the
    /// server's message.
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the project cannot be fetched.
    pub async fn get_one_project(&self, id: &ProjectId) -> Result<(), SyncError> {
        self.projects.set_loading(true);
        let result = self.transport.get_project(id).await;
        self.projects.set_loading(false);

        match result {
            Ok(project) => {
                tracing::info!(project = %id, tasks = project.tasks.len(), "project opened");
                self.projects.replace_project(project);
                self.alerts.clear();
                if let Err(e) = self.applier.follow(id).await {
                    tracing::warn!(project = %id, error = %e, "cannot follow project, peer edits will not show");
                }
                Ok(())
            }
            Err(e @ TransportError::MissingCredential) => Err(self.request_failed("get_one_project", e)),
            Err(e) => {
                tracing::warn!(project = %id, error = %e, "project could not be opened");
                self.navigator.navigate(Route::Projects);
                self.alerts
                    .show_for(Alert::error(e.user_message()), self.config.alerts.read_error());
                Err(e.into())
            }
        }
    }

    /// Create a project, or update it when the draft carries an id
    ///
    /// On success the user is sent back to the projects list once the alert
    /// window has passed.
    ///
    /// # Errors
    /// [`SyncError::Validation`] for incomplete drafts, [`SyncError::Transport`]
    /// if the server call fails.
    pub async fn submit_project(&self, draft: &ProjectDraft) -> Result<ProjectSummary, SyncError> {
        self.check_form(draft.validate())?;

        let (result, message) = match draft.id.as_ref().filter(|id| !id.is_blank()) {
            Some(id) => (
                self.transport.update_project(id, draft).await,
                "Project updated successfully",
            ),
            None => (
                self.transport.create_project(draft).await,
                "Project created successfully",
            ),
        };
        let summary = result.map_err(|e| self.request_failed("submit_project", e))?;

        tracing::info!(project = %summary.id, update = draft.is_update(), "project saved");
        self.projects.upsert_summary(summary.clone());
        self.redirect_to_projects(Alert::success(message));
        Ok(summary)
    }

    /// Delete a project
    ///
    /// Closes the project if it is the one open, then sends the user back to
    /// the projects list once the alert window has passed.
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the server call fails.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), SyncError> {
        let message = self
            .transport
            .delete_project(id)
            .await
            .map_err(|e| self.request_failed("delete_project", e))?;

        tracing::info!(project = %id, "project deleted");
        self.projects.remove_summary(id);
        if self.projects.project_id().as_ref() == Some(id) {
            self.applier.detach();
            self.projects.clear_project();
        }
        self.redirect_to_projects(Alert::success(message));
        Ok(())
    }

    /// Create a task, or update it when the draft carries an id
    ///
    /// # Errors
    /// [`SyncError::Validation`] for incomplete drafts, [`SyncError::Transport`]
    /// if the server call fails.
    pub async fn submit_task(&self, draft: &TaskDraft) -> Result<Task, SyncError> {
        self.check_form(draft.validate())?;

        let event = match draft.id.as_ref().filter(|id| !id.is_blank()) {
            Some(id) => self
                .transport
                .update_task(id, draft)
                .await
                .map(MutationEvent::TaskUpdated),
            None => self
                .transport
                .create_task(draft)
                .await
                .map(MutationEvent::TaskCreated),
        }
        .map_err(|e| self.request_failed("submit_task", e))?;

        self.alerts.clear();
        if self.dialog.current().task_form_visible() {
            self.dialog.close();
        }
        let task = event.task().clone();
        self.commit(event);
        Ok(task)
    }

    /// Delete the task bound to the delete dialog
    ///
    /// # Errors
    /// [`SyncError::NothingBound`] if no task delete dialog is open,
    /// [`SyncError::Transport`] if the server call fails.
    pub async fn delete_one_task(&self) -> Result<(), SyncError> {
        let Dialog::DeleteTask(task) = self.dialog.current() else {
            return Err(SyncError::NothingBound("task"));
        };

        let message = self
            .transport
            .delete_task(&task.id)
            .await
            .map_err(|e| self.request_failed("delete_one_task", e))?;

        self.alerts
            .show_for(Alert::success(message), self.config.alerts.task_delete());
        self.dialog.close();
        self.commit(MutationEvent::TaskDeleted(task));
        Ok(())
    }

    /// Toggle a task between pending and completed
    ///
    /// # Errors
    /// [`SyncError::Transport`] if the server call fails.
    pub async fn complete_task(&self, id: &TaskId) -> Result<Task, SyncError> {
        let task = self
            .transport
            .toggle_task_status(id)
            .await
            .map_err(|e| self.request_failed("complete_task", e))?;

        if self.dialog.current().bound_task().is_some() {
            self.dialog.close();
        }
        self.alerts.clear();
        self.commit(MutationEvent::TaskStatusChanged(task.clone()));
        Ok(task)
    }

    /// Look up the user registered with `email`
    ///
    /// The result becomes the collaborator candidate; on failure the candidate
    /// is emptied and the server's message is shown.
    ///
    /// # Errors
    /// [`SyncError::Validation`] for a malformed email, [`SyncError::Transport`]
    /// if the lookup fails.
    pub async fn submit_collaborator(&self, email: &str) -> Result<Collaborator, SyncError> {
        self.check_form(Collaborator::validate_email(email))?;

        self.projects.set_loading(true);
        let result = self.transport.find_collaborator(email).await;
        self.projects.set_loading(false);

        match result {
            Ok(collaborator) => {
                tracing::debug!(collaborator = %collaborator.id, "collaborator found");
                self.candidate.send_replace(Some(collaborator.clone()));
                self.alerts.clear();
                Ok(collaborator)
            }
            Err(e) => {
                self.candidate.send_replace(None);
                Err(self.read_failed("submit_collaborator", e))
            }
        }
    }

    /// Add the user registered with `email` to the open project
    ///
    /// # Errors
    /// [`SyncError::NoProjectOpen`] without an open project,
    /// [`SyncError::Transport`] if the server refuses.
    pub async fn add_collaborator(&self, email: &str) -> Result<(), SyncError> {
        let project = self.projects.project_id().ok_or(SyncError::NoProjectOpen)?;

        let message = self
            .transport
            .add_collaborator(&project, email)
            .await
            .map_err(|e| self.read_failed("add_collaborator", e))?;

        let candidate = self.candidate.send_replace(None);
        if let Some(collaborator) = candidate.filter(|c| c.has_email(email)) {
            self.projects.apply_collaborator_added(&collaborator);
        }
        tracing::info!(%project, "collaborator added");
        self.alerts
            .show_for(Alert::success(message), self.config.alerts.collaborator());
        Ok(())
    }

    /// Remove the collaborator bound to the delete dialog from the open project
    ///
    /// # Errors
    /// [`SyncError::NothingBound`] if no collaborator delete dialog is open,
    /// [`SyncError::NoProjectOpen`] without an open project,
    /// [`SyncError::Transport`] if the server call fails.
    pub async fn delete_collaborator(&self) -> Result<(), SyncError> {
        let Dialog::DeleteCollaborator(collaborator) = self.dialog.current() else {
            return Err(SyncError::NothingBound("collaborator"));
        };
        let project = self.projects.project_id().ok_or(SyncError::NoProjectOpen)?;

        let message = self
            .transport
            .remove_collaborator(&project, &collaborator.id)
            .await
            .map_err(|e| self.request_failed("delete_collaborator", e))?;

        tracing::info!(%project, collaborator = %collaborator.id, "collaborator removed");
        self.projects.apply_collaborator_removed(&collaborator.id);
        self.alerts
            .show_for(Alert::success(message), self.config.alerts.collaborator());
        self.dialog.close();
        Ok(())
    }

    /// Forget everything tied to the signed-out session
    pub fn logout_session_projects(&self) {
        self.applier.detach();
        self.projects.reset();
        self.alerts.clear();
        self.dialog.reset();
        self.candidate.send_replace(None);
        tracing::info!("session state cleared");
    }

    /// Apply a locally confirmed mutation, then tell the other viewers
    fn commit(&self, event: MutationEvent) {
        let changed = self.projects.apply(&event);
        tracing::info!(
            event = event.name(),
            project = %event.project_id(),
            task = %event.task_id(),
            changed,
            "mutation committed"
        );
        self.channel.publish(event);
    }

    fn check_form(&self, check: Result<(), ValidationError>) -> Result<(), SyncError> {
        check.map_err(|e| {
            tracing::debug!(error = %e, "form rejected");
            self.show_alert(Alert::error(e.user_message()));
            e.into()
        })
    }

    /// Show a success alert, then clear it and go to the projects list
    fn redirect_to_projects(&self, alert: Alert) {
        let window = self.config.alerts.project_redirect();
        self.alerts.show_for(alert, window);
        let navigator = Arc::clone(&self.navigator);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            navigator.navigate(Route::Projects);
        });
    }

    /// Failure the user is told about
    fn read_failed(&self, operation: &'static str, err: TransportError) -> SyncError {
        if err == TransportError::MissingCredential {
            tracing::debug!(operation, "no session credential, request skipped");
        } else {
            tracing::warn!(operation, error = %err, "request failed");
            self.alerts.show_for(
                Alert::error(err.user_message()),
                self.config.alerts.collaborator(),
            );
        }
        err.into()
    }

    /// Failure that is only logged unless write errors are surfaced
    fn request_failed(&self, operation: &'static str, err: TransportError) -> SyncError {
        if err == TransportError::MissingCredential {
            tracing::debug!(operation, "no session credential, request skipped");
        } else {
            tracing::warn!(operation, error = %err, "request failed");
            if self.config.surface_write_errors {
                self.show_alert(Alert::error(err.user_message()));
            }
        }
        err.into()
    }
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("projects", &self.projects)
            .field("alerts", &self.alerts)
            .field("dialog", &self.dialog)
            .field("applier", &self.applier)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BroadcastHub;
    use crate::navigation::RouteTracker;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use tasksync_model::{Priority, Project, UserId};

    mock! {
        Server {}

        #[async_trait]
        impl Transport for Server {
            async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TransportError>;
            async fn get_project(&self, id: &ProjectId) -> Result<Project, TransportError>;
            async fn create_project(&self, draft: &ProjectDraft) -> Result<ProjectSummary, TransportError>;
            async fn update_project(&self, id: &ProjectId, draft: &ProjectDraft) -> Result<ProjectSummary, TransportError>;
            async fn delete_project(&self, id: &ProjectId) -> Result<String, TransportError>;
            async fn create_task(&self, draft: &TaskDraft) -> Result<Task, TransportError>;
            async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, TransportError>;
            async fn delete_task(&self, id: &TaskId) -> Result<String, TransportError>;
            async fn toggle_task_status(&self, id: &TaskId) -> Result<Task, TransportError>;
            async fn find_collaborator(&self, email: &str) -> Result<Collaborator, TransportError>;
            async fn add_collaborator(&self, project: &ProjectId, email: &str) -> Result<String, TransportError>;
            async fn remove_collaborator(&self, project: &ProjectId, collaborator: &UserId) -> Result<String, TransportError>;
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn coordinator(server: MockServer, config: SyncConfig) -> (MutationCoordinator, Arc<RouteTracker>) {
        let routes = Arc::new(RouteTracker::new());
        let hub = BroadcastHub::new(16);
        let coordinator = MutationCoordinator::new(
            Arc::new(server),
            Arc::new(hub.connect()),
            Arc::clone(&routes) as Arc<dyn Navigator>,
            config,
        );
        (coordinator, routes)
    }

    #[tokio::test]
    async fn invalid_task_draft_alerts_without_request() {
        let (coordinator, _) = coordinator(MockServer::new(), SyncConfig::default());
        let draft = TaskDraft::new(ProjectId::from("p1")).with_name("Design");

        let err = coordinator.submit_task(&draft).await.unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(
            coordinator.alerts().current(),
            Some(Alert::error("All fields are required"))
        );
    }

    #[tokio::test]
    async fn blank_task_description_alerts_without_request() {
        let (coordinator, _) = coordinator(MockServer::new(), SyncConfig::default());
        let draft = TaskDraft::new(ProjectId::from("p1"))
            .with_name("Design")
            .with_priority(Priority::High)
            .with_date_delivery(date());

        let err = coordinator.submit_task(&draft).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::MissingField("description"))
        ));
        assert_eq!(
            coordinator.alerts().current(),
            Some(Alert::error("All fields are required"))
        );
    }

    #[tokio::test]
    async fn missing_credential_is_silent() {
        let mut server = MockServer::new();
        server
            .expect_toggle_task_status()
            .times(1)
            .returning(|_| Err(TransportError::MissingCredential));
        let config = SyncConfig::default().with_surface_write_errors(true);
        let (coordinator, _) = coordinator(server, config);

        let err = coordinator.complete_task(&TaskId::from("t1")).await.unwrap_err();

        assert!(err.is_unauthenticated());
        assert_eq!(coordinator.alerts().current(), None);
    }

    #[tokio::test]
    async fn write_errors_are_quiet_by_default() {
        let mut server = MockServer::new();
        server.expect_delete_project().returning(|_| {
            Err(TransportError::Rejected {
                status: 403,
                message: "Action not allowed".to_string(),
            })
        });
        let (coordinator, _) = coordinator(server, SyncConfig::default());

        assert!(coordinator.delete_project(&ProjectId::from("p1")).await.is_err());
        assert_eq!(coordinator.alerts().current(), None);
    }

    #[tokio::test]
    async fn write_errors_surface_when_configured() {
        let mut server = MockServer::new();
        server.expect_delete_project().returning(|_| {
            Err(TransportError::Rejected {
                status: 403,
                message: "Action not allowed".to_string(),
            })
        });
        let config = SyncConfig::default().with_surface_write_errors(true);
        let (coordinator, _) = coordinator(server, config);

        assert!(coordinator.delete_project(&ProjectId::from("p1")).await.is_err());
        assert_eq!(
            coordinator.alerts().current(),
            Some(Alert::error("Action not allowed"))
        );
    }

    #[tokio::test]
    async fn failed_open_redirects_with_server_message() {
        let mut server = MockServer::new();
        server
            .expect_get_project()
            .withf(|id| id.as_str() == "p404")
            .returning(|_| {
                Err(TransportError::Rejected {
                    status: 404,
                    message: "Project not found".to_string(),
                })
            });
        let (coordinator, routes) = coordinator(server, SyncConfig::default());
        routes.navigate(Route::Project(ProjectId::from("p404")));

        assert!(coordinator.get_one_project(&ProjectId::from("p404")).await.is_err());

        assert_eq!(routes.current(), Route::Projects);
        assert_eq!(
            coordinator.alerts().current(),
            Some(Alert::error("Project not found"))
        );
        assert!(!coordinator.projects().is_loading());
    }

    #[tokio::test]
    async fn delete_without_bound_task_is_refused() {
        let (coordinator, _) = coordinator(MockServer::new(), SyncConfig::default());
        coordinator.dialog().open_create_task();

        let err = coordinator.delete_one_task().await.unwrap_err();

        assert!(matches!(err, SyncError::NothingBound("task")));
    }

    #[tokio::test]
    async fn edited_task_replaces_in_place() {
        let original = Task::new(TaskId::from("t1"), ProjectId::from("p1"), "Draft", Priority::Low, date());
        let edited = original.clone().with_description("now with details");
        let returned = edited.clone();

        let mut server = MockServer::new();
        server
            .expect_update_task()
            .withf(|id, draft| id.as_str() == "t1" && draft.is_update())
            .returning(move |_, _| Ok(returned.clone()));
        let (coordinator, _) = coordinator(server, SyncConfig::default());
        coordinator.projects().replace_project(
            Project::new(ProjectId::from("p1"), "Site", UserId::from("u1"))
                .with_tasks(vec![original.clone()]),
        );
        coordinator.dialog().open_edit_task(original.clone());

        let draft = original.to_draft().with_description("now with details");
        coordinator.submit_task(&draft).await.unwrap();

        let project = coordinator.projects().project().unwrap();
        assert_eq!(project.tasks, vec![edited]);
        assert_eq!(coordinator.dialog().current(), Dialog::Closed);
    }
}
