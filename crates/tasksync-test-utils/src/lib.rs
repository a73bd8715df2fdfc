//! Testing utilities for tasksync workspace
//!
//! Shared fake server, fixtures, and a two-client harness.

#![allow(missing_docs)]

mod fake;

pub use fake::{FakeServer, FakeTransport, USER_NOT_FOUND};

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tasksync_core::{
    BroadcastHub, Credentials, MutationCoordinator, Navigator, RouteTracker, SyncConfig,
    SyncSession,
};
use tasksync_model::{Collaborator, Priority, Project, ProjectId, Task, TaskId, UserId};

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

pub fn task(id: &str, project: &str) -> Task {
    Task::new(
        TaskId::from(id),
        ProjectId::from(project),
        format!("Task {id}"),
        Priority::Medium,
        date(),
    )
}

pub fn project(id: &str) -> Project {
    Project::new(ProjectId::from(id), format!("Project {id}"), UserId::from("owner"))
}

pub fn collaborator(id: &str, name: &str) -> Collaborator {
    Collaborator::new(
        UserId::from(id),
        name,
        format!("{}@example.com", name.to_lowercase()),
    )
}

/// Seeded server used by most flow tests: project `p1` with tasks `t1`, `t2`
/// and one registered user, `ana@example.com`
pub fn seeded_server() -> FakeServer {
    FakeServer::new()
        .with_project(project("p1").with_tasks(vec![task("t1", "p1"), task("t2", "p1")]))
        .with_project(project("p2"))
        .with_user(collaborator("u2", "Ana"))
}

/// One signed-in client of a [`FakeServer`]
pub struct Client {
    pub session: SyncSession,
    pub routes: Arc<RouteTracker>,
}

impl Client {
    /// Client with a token, attached to `hub`
    pub fn connect(server: &FakeServer, hub: &Arc<BroadcastHub>, config: SyncConfig) -> Self {
        Self::with_credentials(server, hub, config, Credentials::new("token"))
    }

    /// Client with the given credential handle
    pub fn with_credentials(
        server: &FakeServer,
        hub: &Arc<BroadcastHub>,
        config: SyncConfig,
        credentials: Credentials,
    ) -> Self {
        let routes = Arc::new(RouteTracker::new());
        let session = SyncSession::with_parts(
            Arc::new(server.client(credentials.clone())),
            Arc::new(hub.connect()),
            Arc::clone(&routes) as Arc<dyn Navigator>,
            credentials,
            config,
        );
        Self { session, routes }
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        self.session.coordinator()
    }

    /// Tasks of the open project, empty when none is open
    pub fn tasks(&self) -> Vec<Task> {
        self.coordinator()
            .projects()
            .project()
            .map(|p| p.tasks.clone())
            .unwrap_or_default()
    }
}

/// Two clients viewing the same server through one in-process hub
pub struct TwoClients {
    pub server: FakeServer,
    pub hub: Arc<BroadcastHub>,
    pub alice: Client,
    pub bob: Client,
}

impl TwoClients {
    pub fn new(server: FakeServer) -> Self {
        let hub = BroadcastHub::new(64);
        let alice = Client::connect(&server, &hub, SyncConfig::default());
        let bob = Client::connect(&server, &hub, SyncConfig::default());
        Self {
            server,
            hub,
            alice,
            bob,
        }
    }

    /// Both clients open `project`
    pub async fn open(&self, project: &str) {
        let id = ProjectId::from(project);
        self.alice.coordinator().get_one_project(&id).await.unwrap();
        self.bob.coordinator().get_one_project(&id).await.unwrap();
    }
}

/// Poll `check` until it holds; panics after one second
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Give in-flight deliveries a chance to land, for asserting that nothing changed
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
