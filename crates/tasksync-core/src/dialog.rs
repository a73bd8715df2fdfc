//! Dialog state
//!
//! Which mutation form is open, together with the entity it operates on.
//! Binding and visibility live in one value, so a delete dialog can never be
//! visible without its task or collaborator, and closing always unbinds.

use tasksync_model::{Collaborator, Task};
use tokio::sync::watch;

/// The open dialog and its bound entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    /// Nothing open
    #[default]
    Closed,
    /// Task form for a new task
    CreateTask,
    /// Task form pre-filled with an existing task
    EditTask(Task),
    /// Delete confirmation for a task
    DeleteTask(Task),
    /// Delete confirmation for a collaborator
    DeleteCollaborator(Collaborator),
}

impl Dialog {
    /// Task form (create or edit) is visible
    #[must_use]
    pub fn task_form_visible(&self) -> bool {
        matches!(self, Self::CreateTask | Self::EditTask(_))
    }

    /// Task delete confirmation is visible
    #[must_use]
    pub fn delete_task_visible(&self) -> bool {
        matches!(self, Self::DeleteTask(_))
    }

    /// Collaborator delete confirmation is visible
    #[must_use]
    pub fn delete_collaborator_visible(&self) -> bool {
        matches!(self, Self::DeleteCollaborator(_))
    }

    /// Task bound to the edit or delete dialog
    #[must_use]
    pub fn bound_task(&self) -> Option<&Task> {
        match self {
            Self::EditTask(task) | Self::DeleteTask(task) => Some(task),
            _ => None,
        }
    }

    /// Collaborator bound to the delete dialog
    #[must_use]
    pub fn bound_collaborator(&self) -> Option<&Collaborator> {
        match self {
            Self::DeleteCollaborator(collaborator) => Some(collaborator),
            _ => None,
        }
    }

    /// Whether any dialog is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Observable holder of the [`Dialog`] and the search dialog flag
#[derive(Debug)]
pub struct DialogStore {
    dialog: watch::Sender<Dialog>,
    search: watch::Sender<bool>,
}

impl DialogStore {
    /// Create store with everything closed
    #[must_use]
    pub fn new() -> Self {
        Self {
            dialog: watch::channel(Dialog::Closed).0,
            search: watch::channel(false).0,
        }
    }

    /// Current dialog
    #[must_use]
    pub fn current(&self) -> Dialog {
        self.dialog.borrow().clone()
    }

    /// Observe dialog changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Dialog> {
        self.dialog.subscribe()
    }

    /// Open the empty task form
    pub fn open_create_task(&self) {
        self.set(Dialog::CreateTask);
    }

    /// Open the task form bound to `task`
    pub fn open_edit_task(&self, task: Task) {
        self.set(Dialog::EditTask(task));
    }

    /// Ask to confirm deleting `task`
    pub fn open_delete_task(&self, task: Task) {
        self.set(Dialog::DeleteTask(task));
    }

    /// Ask to confirm removing `collaborator`
    pub fn open_delete_collaborator(&self, collaborator: Collaborator) {
        self.set(Dialog::DeleteCollaborator(collaborator));
    }

    /// Close whatever is open and drop its binding
    pub fn close(&self) {
        self.set(Dialog::Closed);
    }

    /// Close the task form if it is open, else open it empty
    pub fn toggle_task_form(&self) {
        self.dialog.send_modify(|dialog| {
            *dialog = if dialog.task_form_visible() {
                Dialog::Closed
            } else {
                Dialog::CreateTask
            };
        });
    }

    /// Flip the search dialog
    pub fn toggle_search(&self) {
        self.search.send_modify(|open| *open = !*open);
    }

    /// Search dialog is visible
    #[must_use]
    pub fn search_visible(&self) -> bool {
        *self.search.borrow()
    }

    /// Close both dialogs
    pub fn reset(&self) {
        self.close();
        self.search.send_if_modified(|open| std::mem::take(open));
    }

    fn set(&self, next: Dialog) {
        self.dialog.send_if_modified(|dialog| {
            if *dialog == next {
                return false;
            }
            *dialog = next;
            true
        });
    }
}

impl Default for DialogStore {
    fn default() -> Self {
        Self::new()
    }
}
