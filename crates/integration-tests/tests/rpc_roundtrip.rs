//! RPC Round-trip Tests
//!
//! Daemon-side server and SDK client over a real localhost socket.

use std::sync::Arc;
use std::time::Duration;

use dashpanel_api_rpc::{RpcServer, RpcServerConfig, ServerHandle};
use dashpanel_core::application::{Dashboard, DashboardOptions};
use dashpanel_core::domain::{DashboardSpec, PollSpec, WidgetSpec};
use dashpanel_core::port::id_provider::UuidProvider;
use dashpanel_core::port::time_provider::SystemTimeProvider;
use dashpanel_infra_system::ShellCommandRunner;
use dashpanel_sdk::{DashpanelClient, PollOutcome};

fn spec() -> DashboardSpec {
    DashboardSpec::new(vec![
        WidgetSpec::new("clock", "Clock")
            .icon("🕐")
            .poll("time", PollSpec::new("--:--", 50, "echo 09:41"))
            .value("time"),
        WidgetSpec::new("power", "Power Options")
            .action("lock", "true")
            .button("🔒 Lock", "lock"),
    ])
}

/// Localhost server on a free port
fn local_config() -> RpcServerConfig {
    RpcServerConfig {
        port: 0,
        ..RpcServerConfig::default()
    }
}

async fn start(config: RpcServerConfig) -> (DashpanelClient, ServerHandle) {
    let dashboard = Dashboard::mount(
        spec(),
        Arc::new(ShellCommandRunner::new("bash", Arc::new(SystemTimeProvider))),
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
        DashboardOptions::default(),
    )
    .unwrap();

    let (handle, addr) = RpcServer::new(config, Arc::new(dashboard))
        .start()
        .await
        .unwrap();

    let client = DashpanelClient::connect(format!("http://{}", addr))
        .await
        .unwrap();
    (client, handle)
}

/// Test 1: Snapshot and single widget carry live values
#[tokio::test]
async fn test_snapshot_over_rpc() {
    let (client, handle) = start(local_config()).await;

    let clock = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let clock = client.widget("clock").await.unwrap();
            if clock.field_value("time") == Some("09:41") {
                return clock;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("clock never resolved over RPC");

    assert_eq!(clock.icon, "🕐");

    let snapshot = client.snapshot().await.unwrap();
    let names: Vec<_> = snapshot.widgets.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["clock", "power"]);
    assert!(snapshot.taken_at_ms > 0);
    assert_eq!(snapshot.widget("power").unwrap().actions(), vec!["lock"]);

    match &snapshot.widget("clock").unwrap().rows[0] {
        dashpanel_sdk::RowSnapshot::Field { outcome, .. } => {
            assert_eq!(*outcome, PollOutcome::Success)
        }
        other => panic!("unexpected row {:?}", other),
    }

    handle.stop().unwrap();
    println!("✅ Test 1: snapshot served over RPC");
}

/// Test 2: Press, unknown names and stats
#[tokio::test]
async fn test_press_and_errors_over_rpc() {
    let (client, handle) = start(local_config()).await;

    let response = client.press("power", "lock").await.unwrap();
    assert!(response.accepted);
    assert!(!response.dispatch_id.is_empty());

    let err = client.press("power", "hibernate").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);

    let err = client.widget("weather").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);

    let stats = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = client.stats().await.unwrap();
            if stats.dispatch_succeeded == 1 {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("dispatch never completed");

    assert_eq!(stats.widgets, 2);
    assert_eq!(stats.polls, 1);
    assert_eq!(stats.dispatched, 1);

    handle.stop().unwrap();
    println!("✅ Test 2: press, not-found and stats over RPC");
}

/// Test 3: Dispatch throttle answers with the throttled code
#[tokio::test]
async fn test_dispatch_throttled_over_rpc() {
    let (client, handle) = start(RpcServerConfig {
        rate_limit_burst: 1,
        rate_limit_rate: 0,
        ..local_config()
    })
    .await;

    client.press("power", "lock").await.unwrap();
    let err = client.press("power", "lock").await.unwrap_err();
    assert!(err.is_throttled(), "unexpected error: {}", err);

    // Reads are not throttled
    assert!(client.snapshot().await.is_ok());

    handle.stop().unwrap();
    println!("✅ Test 3: throttled dispatch rejected");
}
