use pretty_assertions::assert_eq;
use std::time::Duration;
use tasksync_core::{BroadcastHub, SyncConfig};
use tasksync_model::{Alert, ProjectId};
use tasksync_test_utils::{seeded_server, Client};
use tokio::time::sleep;

fn client() -> Client {
    Client::connect(&seeded_server(), &BroadcastHub::new(16), SyncConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_generic_alert_clears_after_two_seconds() {
    let client = client();
    client.coordinator().show_alert(Alert::error("All fields are required"));

    sleep(Duration::from_millis(1999)).await;
    assert!(client.coordinator().alerts().current().is_some());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(client.coordinator().alerts().current(), None);
}

#[tokio::test(start_paused = true)]
async fn test_read_error_alert_uses_longer_window() {
    let client = client();
    let _ = client
        .coordinator()
        .get_one_project(&ProjectId::from("missing"))
        .await;

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(
        client.coordinator().alerts().current(),
        Some(Alert::error("Project not found"))
    );

    sleep(Duration::from_millis(501)).await;
    assert_eq!(client.coordinator().alerts().current(), None);
}

#[tokio::test(start_paused = true)]
async fn test_new_alert_preempts_old_timer() {
    let client = client();
    let coordinator = client.coordinator();
    coordinator.show_alert(Alert::error("first"));
    sleep(Duration::from_millis(1900)).await;

    coordinator.show_alert(Alert::success("second"));
    sleep(Duration::from_millis(200)).await;
    assert_eq!(coordinator.alerts().current(), Some(Alert::success("second")));

    sleep(Duration::from_millis(1801)).await;
    assert_eq!(coordinator.alerts().current(), None);
}

#[tokio::test(start_paused = true)]
async fn test_configured_windows_apply() {
    let mut config = SyncConfig::default();
    config.alerts.generic_ms = 500;
    let client = Client::connect(&seeded_server(), &BroadcastHub::new(16), config);

    client.coordinator().show_alert(Alert::success("short"));
    sleep(Duration::from_millis(501)).await;

    assert_eq!(client.coordinator().alerts().current(), None);
}
