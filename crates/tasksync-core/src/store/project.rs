//! Project Store
//!
//! Holds the open project, the projects summary list and the loading flag.
//! Each value lives in a `tokio::sync::watch` channel: readers get `Arc`
//! snapshots and can await changes, writers replace the whole value.

use super::merge;
use std::sync::Arc;
use tasksync_model::{Collaborator, MutationEvent, Project, ProjectId, ProjectSummary, Task, UserId};
use tokio::sync::watch;

/// Snapshot of the open project
pub type ProjectSnapshot = Option<Arc<Project>>;

/// Authoritative local replica of the open project and the projects list
///
/// Mutated only by the Mutation Coordinator and the Remote Event Applier.
#[derive(Debug)]
pub struct ProjectStore {
    project: watch::Sender<ProjectSnapshot>,
    projects: watch::Sender<Arc<Vec<ProjectSummary>>>,
    loading: watch::Sender<bool>,
}

impl ProjectStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            project: watch::channel(None).0,
            projects: watch::channel(Arc::new(Vec::new())).0,
            loading: watch::channel(false).0,
        }
    }

    /// Open project
    #[must_use]
    pub fn project(&self) -> ProjectSnapshot {
        self.project.borrow().clone()
    }

    /// Id of the open project
    #[must_use]
    pub fn project_id(&self) -> Option<ProjectId> {
        self.project.borrow().as_ref().map(|p| p.id.clone())
    }

    /// Projects summary list
    #[must_use]
    pub fn projects(&self) -> Arc<Vec<ProjectSummary>> {
        Arc::clone(&self.projects.borrow())
    }

    /// Loading flag
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Observe the open project
    #[must_use]
    pub fn watch_project(&self) -> watch::Receiver<ProjectSnapshot> {
        self.project.subscribe()
    }

    /// Observe the projects list
    #[must_use]
    pub fn watch_projects(&self) -> watch::Receiver<Arc<Vec<ProjectSummary>>> {
        self.projects.subscribe()
    }

    /// Set the loading flag
    pub fn set_loading(&self, loading: bool) {
        self.loading.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }

    /// Replace the open project wholesale
    pub fn replace_project(&self, project: Project) {
        self.project.send_replace(Some(Arc::new(project)));
    }

    /// Close the open project
    pub fn clear_project(&self) {
        self.project.send_if_modified(|current| current.take().is_some());
    }

    /// Apply a merge primitive with copy/modify/replace semantics
    ///
    /// Observers never see a partially modified project; an unchanged result
    /// does not notify them.
    fn merge_project(&self, merge: impl FnOnce(&Project) -> Option<Project>) -> bool {
        self.project.send_if_modified(|current| {
            let Some(next) = current.as_deref().and_then(merge) else {
                return false;
            };
            *current = Some(Arc::new(next));
            true
        })
    }

    /// Append a task to the open project if it belongs there and is new
    pub fn apply_task_created(&self, task: &Task) -> bool {
        self.merge_project(|p| merge::task_created(p, task))
    }

    /// Replace the task with the same id
    pub fn apply_task_updated(&self, task: &Task) -> bool {
        self.merge_project(|p| merge::task_replaced(p, task))
    }

    /// Remove the task with the same id
    pub fn apply_task_deleted(&self, task: &Task) -> bool {
        self.merge_project(|p| merge::task_removed(p, task))
    }

    /// Replace the task whose status was toggled
    pub fn apply_task_status_changed(&self, task: &Task) -> bool {
        self.merge_project(|p| merge::task_replaced(p, task))
    }

    /// Apply any mutation event; returns whether the store changed
    pub fn apply(&self, event: &MutationEvent) -> bool {
        match event {
            MutationEvent::TaskCreated(task) => self.apply_task_created(task),
            MutationEvent::TaskUpdated(task) => self.apply_task_updated(task),
            MutationEvent::TaskDeleted(task) => self.apply_task_deleted(task),
            MutationEvent::TaskStatusChanged(task) => self.apply_task_status_changed(task),
        }
    }

    /// Add a collaborator to the open project
    pub fn apply_collaborator_added(&self, collaborator: &Collaborator) -> bool {
        self.merge_project(|p| merge::collaborator_added(p, collaborator))
    }

    /// Remove a collaborator from the open project
    pub fn apply_collaborator_removed(&self, user: &UserId) -> bool {
        self.merge_project(|p| merge::collaborator_removed(p, user))
    }

    /// Replace the projects list
    pub fn set_projects(&self, projects: Vec<ProjectSummary>) {
        self.projects.send_replace(Arc::new(projects));
    }

    /// Insert a summary, or replace the one with the same id
    pub fn upsert_summary(&self, summary: ProjectSummary) {
        self.projects.send_modify(|projects| {
            let mut next: Vec<ProjectSummary> = (**projects).clone();
            match next.iter_mut().find(|p| p.id == summary.id) {
                Some(existing) => *existing = summary,
                None => next.push(summary),
            }
            *projects = Arc::new(next);
        });
    }

    /// Remove the summary with this id
    pub fn remove_summary(&self, id: &ProjectId) -> bool {
        self.projects.send_if_modified(|projects| {
            if !projects.iter().any(|p| &p.id == id) {
                return false;
            }
            let next = projects.iter().filter(|p| &p.id != id).cloned().collect();
            *projects = Arc::new(next);
            true
        })
    }

    /// Case-insensitive name search over the projects list
    #[must_use]
    pub fn search_projects(&self, query: &str) -> Vec<ProjectSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.projects
            .borrow()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Drop the open project and the projects list
    pub fn reset(&self) {
        self.clear_project();
        self.set_projects(Vec::new());
        self.set_loading(false);
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}
