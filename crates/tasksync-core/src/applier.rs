//! Remote Event Applier
//!
//! Subscribes to the Notification Channel for the open project and folds
//! peer events into the [`ProjectStore`] through the same merge primitives
//! the local path uses. It never publishes, so applying a remote event can
//! not echo back into the room.

use crate::channel::NotificationChannel;
use crate::error::ChannelError;
use crate::store::ProjectStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tasksync_model::{MutationEvent, ProjectId};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Following {
    project: ProjectId,
    task: JoinHandle<()>,
}

/// Applies peer mutation events for the followed project
pub struct RemoteEventApplier {
    channel: Arc<dyn NotificationChannel>,
    projects: Arc<ProjectStore>,
    active: Mutex<Option<Following>>,
}

impl RemoteEventApplier {
    /// Create applier writing into `projects`
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>, projects: Arc<ProjectStore>) -> Self {
        Self {
            channel,
            projects,
            active: Mutex::new(None),
        }
    }

    /// Follow the notification room of `project`
    ///
    /// Following the project already followed is a no-op. Following another
    /// one stops the previous subscription before joining.
    ///
    /// # Errors
    /// [`ChannelError`] if the room cannot be joined; nothing is followed then.
    pub async fn follow(&self, project: &ProjectId) -> Result<(), ChannelError> {
        {
            let mut active = self.active.lock();
            if let Some(current) = active.as_ref() {
                if &current.project == project && !current.task.is_finished() {
                    return Ok(());
                }
            }
            if let Some(previous) = active.take() {
                previous.task.abort();
            }
        }

        // Subscribe first so nothing published right after the join is missed.
        let events = self.channel.subscribe();
        self.channel.join(project).await?;

        let task = tokio::spawn(run(events, Arc::clone(&self.projects), project.clone()));
        if let Some(raced) = self.active.lock().replace(Following {
            project: project.clone(),
            task,
        }) {
            raced.task.abort();
        }
        tracing::info!(%project, "following project");
        Ok(())
    }

    /// Stop following
    pub fn detach(&self) {
        if let Some(previous) = self.active.lock().take() {
            previous.task.abort();
            tracing::debug!(project = %previous.project, "stopped following project");
        }
    }

    /// Project currently followed
    #[must_use]
    pub fn following(&self) -> Option<ProjectId> {
        self.active
            .lock()
            .as_ref()
            .filter(|f| !f.task.is_finished())
            .map(|f| f.project.clone())
    }

    /// Apply one event as if it had arrived from the channel
    ///
    /// Returns whether the store changed.
    pub fn apply_event(&self, event: &MutationEvent) -> bool {
        if let Some(project) = self.following() {
            if event.project_id() != &project {
                return false;
            }
        }
        apply(&self.projects, event)
    }
}

impl std::fmt::Debug for RemoteEventApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEventApplier")
            .field("following", &self.following())
            .finish_non_exhaustive()
    }
}

impl Drop for RemoteEventApplier {
    fn drop(&mut self) {
        if let Some(previous) = self.active.get_mut().take() {
            previous.task.abort();
        }
    }
}

async fn run(
    mut events: broadcast::Receiver<MutationEvent>,
    projects: Arc<ProjectStore>,
    project: ProjectId,
) {
    loop {
        match events.recv().await {
            Ok(event) if event.project_id() == &project => {
                apply(&projects, &event);
            }
            Ok(event) => {
                tracing::trace!(
                    %project,
                    other = %event.project_id(),
                    event = event.name(),
                    "event for another project dropped"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(%project, skipped, "notification subscriber lagged, events lost");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!(%project, "notification channel closed");
                break;
            }
        }
    }
}

fn apply(projects: &ProjectStore, event: &MutationEvent) -> bool {
    let changed = projects.apply(event);
    tracing::debug!(
        event = event.name(),
        project = %event.project_id(),
        task = %event.task_id(),
        changed,
        "remote event applied"
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BroadcastHub;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tasksync_model::{Priority, Project, Task, TaskId, UserId};

    fn task(id: &str, project: &str) -> Task {
        Task::new(
            TaskId::from(id),
            ProjectId::from(project),
            "a",
            Priority::Low,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn store_with(project: &str) -> Arc<ProjectStore> {
        let store = Arc::new(ProjectStore::new());
        store.replace_project(Project::new(ProjectId::from(project), "Site", UserId::from("u1")));
        store
    }

    async fn wait_for_tasks(store: &ProjectStore, count: usize) {
        let mut rx = store.watch_project();
        tokio::time::timeout(Duration::from_secs(1), async {
            while rx.borrow_and_update().as_ref().map_or(0, |p| p.tasks.len()) != count {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn applies_peer_events_for_followed_project() {
        let hub = BroadcastHub::new(16);
        let peer = hub.connect();
        let store = store_with("p1");
        let applier = RemoteEventApplier::new(Arc::new(hub.connect()), Arc::clone(&store));

        applier.follow(&ProjectId::from("p1")).await.unwrap();
        peer.join(&ProjectId::from("p1")).await.unwrap();
        peer.publish(MutationEvent::TaskCreated(task("t1", "p1")));

        wait_for_tasks(&store, 1).await;
        assert_eq!(applier.following(), Some(ProjectId::from("p1")));
    }

    #[tokio::test]
    async fn following_same_project_twice_keeps_subscription() {
        let hub = BroadcastHub::new(16);
        let applier = RemoteEventApplier::new(Arc::new(hub.connect()), store_with("p1"));

        applier.follow(&ProjectId::from("p1")).await.unwrap();
        applier.follow(&ProjectId::from("p1")).await.unwrap();

        assert_eq!(applier.following(), Some(ProjectId::from("p1")));
    }

    #[tokio::test]
    async fn apply_event_ignores_other_projects() {
        let hub = BroadcastHub::new(16);
        let store = store_with("p1");
        let applier = RemoteEventApplier::new(Arc::new(hub.connect()), Arc::clone(&store));
        applier.follow(&ProjectId::from("p1")).await.unwrap();

        assert!(!applier.apply_event(&MutationEvent::TaskCreated(task("t1", "p2"))));
        assert!(applier.apply_event(&MutationEvent::TaskCreated(task("t1", "p1"))));
        assert!(!applier.apply_event(&MutationEvent::TaskCreated(task("t1", "p1"))));
    }

    #[tokio::test]
    async fn detach_stops_following() {
        let hub = BroadcastHub::new(16);
        let applier = RemoteEventApplier::new(Arc::new(hub.connect()), store_with("p1"));
        applier.follow(&ProjectId::from("p1")).await.unwrap();

        applier.detach();

        assert_eq!(applier.following(), None);
    }
}
