//! Alert Store
//!
//! Zero or one transient alert. A timed alert clears itself after its window
//! unless a newer alert has replaced it first; each alert bumps a generation
//! counter and a clear timer only fires for the generation it was armed for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tasksync_model::Alert;
use tokio::runtime::Handle;
use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    alert: watch::Sender<Option<Alert>>,
    generation: AtomicU64,
    window: Duration,
}

/// Holder of the single live alert
///
/// Clone is cheap; clones share the alert.
#[derive(Debug, Clone)]
pub struct AlertStore {
    inner: Arc<Inner>,
}

impl AlertStore {
    /// Create store whose [`show`](Self::show) uses `window`
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                alert: watch::channel(None).0,
                generation: AtomicU64::new(0),
                window,
            }),
        }
    }

    /// Default window of [`show`](Self::show)
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Show `alert` for the default window
    pub fn show(&self, alert: Alert) {
        self.show_for(alert, self.inner.window);
    }

    /// Show `alert` and clear it after `window`
    ///
    /// The clear timer runs on the current tokio runtime. Outside one the
    /// alert is shown without a timer, as with [`set`](Self::set).
    pub fn show_for(&self, alert: Alert, window: Duration) {
        let generation = self.publish(Some(alert));
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!(?window, "no tokio runtime, alert will not clear itself");
            return;
        };
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::time::sleep(window).await;
            inner.expire(generation);
        });
    }

    /// Show `alert` until something else replaces or clears it
    pub fn set(&self, alert: Alert) {
        self.publish(Some(alert));
    }

    /// Remove the alert and disarm any pending clear
    pub fn clear(&self) {
        self.publish(None);
    }

    /// Current alert
    #[must_use]
    pub fn current(&self) -> Option<Alert> {
        self.inner.alert.borrow().clone()
    }

    /// Observe alert changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Alert>> {
        self.inner.alert.subscribe()
    }

    fn publish(&self, alert: Option<Alert>) -> u64 {
        let mut generation = 0;
        // Bumped under the channel's write lock; `expire` checks it there.
        self.inner.alert.send_if_modified(|current| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let changed = *current != alert;
            *current = alert;
            changed
        });
        generation
    }
}

impl Inner {
    /// Clear the alert if it is still the one published as `generation`
    fn expire(&self, generation: u64) {
        self.alert.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || current.is_none() {
                return false;
            }
            *current = None;
            true
        });
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn shown_alert_clears_after_window() {
        let alerts = AlertStore::default();
        alerts.show(Alert::success("Saved"));
        assert_eq!(alerts.current(), Some(Alert::success("Saved")));

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(alerts.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(alerts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_alert_preempts_pending_clear() {
        let alerts = AlertStore::default();
        alerts.show(Alert::error("first"));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        alerts.show_for(Alert::error("second"), Duration::from_millis(3000));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(alerts.current(), Some(Alert::error("second")));

        tokio::time::sleep(Duration::from_millis(2001)).await;
        assert_eq!(alerts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn set_alert_stays_until_cleared() {
        let alerts = AlertStore::default();
        alerts.show(Alert::error("timed"));
        alerts.set(Alert::success("sticky"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(alerts.current(), Some(Alert::success("sticky")));

        alerts.clear();
        assert_eq!(alerts.current(), None);
    }

    #[test]
    fn show_without_runtime_keeps_alert() {
        let alerts = AlertStore::default();
        alerts.show(Alert::error("offline"));

        assert_eq!(alerts.current(), Some(Alert::error("offline")));
    }

    #[test]
    fn stale_expiry_leaves_newer_alert() {
        let alerts = AlertStore::default();
        let armed = alerts.publish(Some(Alert::error("first")));
        alerts.set(Alert::success("second"));

        alerts.inner.expire(armed);
        assert_eq!(alerts.current(), Some(Alert::success("second")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn expiring_timer_never_clears_concurrent_alert() {
        let alerts = AlertStore::default();
        for round in 0..200 {
            alerts.show_for(Alert::error("short"), Duration::from_millis(1));
            let writer = alerts.clone();
            let expected = Alert::success(format!("kept {round}"));
            let sent = expected.clone();
            tokio::task::spawn_blocking(move || {
                std::thread::sleep(Duration::from_millis(1));
                writer.set(sent);
            })
            .await
            .unwrap();

            tokio::time::sleep(Duration::from_millis(3)).await;
            assert_eq!(alerts.current(), Some(expected));
        }
    }
}
