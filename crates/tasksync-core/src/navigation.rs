//! Navigation seam
//!
//! The coordinator redirects after some mutations; the host decides what a
//! route change means. [`RouteTracker`] just records the latest route.

use std::fmt;
use tasksync_model::ProjectId;
use tokio::sync::watch;

/// Views the coordinator can send the user to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    /// Projects list
    #[default]
    Projects,
    /// A single project
    Project(ProjectId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projects => f.write_str("/projects"),
            Self::Project(id) => write!(f, "/projects/{id}"),
        }
    }
}

/// Routing collaborator
pub trait Navigator: Send + Sync {
    /// Move to `route`
    fn navigate(&self, route: Route);
}

/// [`Navigator`] that publishes the current route
#[derive(Debug)]
pub struct RouteTracker {
    route: watch::Sender<Route>,
}

impl RouteTracker {
    /// Start at the projects list
    #[must_use]
    pub fn new() -> Self {
        Self {
            route: watch::channel(Route::Projects).0,
        }
    }

    /// Latest route
    #[must_use]
    pub fn current(&self) -> Route {
        self.route.borrow().clone()
    }

    /// Observe route changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for RouteTracker {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.route.send_replace(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_records_latest_route() {
        let tracker = RouteTracker::new();
        let mut rx = tracker.subscribe();

        tracker.navigate(Route::Project(ProjectId::from("p1")));

        assert!(rx.has_changed().unwrap());
        assert_eq!(tracker.current().to_string(), "/projects/p1");
    }
}
