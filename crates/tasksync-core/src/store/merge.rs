//! Merge primitives
//!
//! Pure functions from the current project and an incoming entity to the next
//! project. `None` means "no change", which makes every primitive idempotent
//! and lets the store skip notifying observers. Both the local success path
//! and the remote event path go through these functions.

use tasksync_model::{Collaborator, MutationEvent, Project, Task, UserId};

/// Append `task` if it belongs to `project` and is not present yet
#[must_use]
pub fn task_created(project: &Project, task: &Task) -> Option<Project> {
    if task.project != project.id || project.task(&task.id).is_some() {
        return None;
    }
    let mut next = project.clone();
    next.tasks.push(task.clone());
    Some(next)
}

/// Replace the task with the same id, in place
#[must_use]
pub fn task_replaced(project: &Project, task: &Task) -> Option<Project> {
    if task.project != project.id {
        return None;
    }
    let index = project.task_position(&task.id)?;
    if project.tasks[index] == *task {
        return None;
    }
    let mut next = project.clone();
    next.tasks[index] = task.clone();
    Some(next)
}

/// Remove the task with the same id
#[must_use]
pub fn task_removed(project: &Project, task: &Task) -> Option<Project> {
    if task.project != project.id {
        return None;
    }
    let index = project.task_position(&task.id)?;
    let mut next = project.clone();
    next.tasks.remove(index);
    Some(next)
}

/// Dispatch an event to its primitive
#[must_use]
pub fn apply_event(project: &Project, event: &MutationEvent) -> Option<Project> {
    match event {
        MutationEvent::TaskCreated(task) => task_created(project, task),
        MutationEvent::TaskUpdated(task) | MutationEvent::TaskStatusChanged(task) => {
            task_replaced(project, task)
        }
        MutationEvent::TaskDeleted(task) => task_removed(project, task),
    }
}

/// Add `collaborator` unless already a member
#[must_use]
pub fn collaborator_added(project: &Project, collaborator: &Collaborator) -> Option<Project> {
    if project.has_collaborator(&collaborator.id) {
        return None;
    }
    let mut next = project.clone();
    next.collaborators.push(collaborator.clone());
    Some(next)
}

/// Remove the collaborator with this user id
#[must_use]
pub fn collaborator_removed(project: &Project, user: &UserId) -> Option<Project> {
    if !project.has_collaborator(user) {
        return None;
    }
    let mut next = project.clone();
    next.collaborators.retain(|c| &c.id != user);
    Some(next)
}
