//! Widget Polling Integration Tests
//!
//! Mounts dashboards against a real `bash` and checks the values users see.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashpanel_core::application::catalog;
use dashpanel_core::application::{Dashboard, DashboardOptions, MountedDashboard, Poller};
use dashpanel_core::domain::{DashboardSpec, PollOutcome, PollSpec, WidgetSpec};
use dashpanel_core::port::id_provider::UuidProvider;
use dashpanel_core::port::time_provider::SystemTimeProvider;
use dashpanel_infra_system::ShellCommandRunner;

fn runner() -> Arc<ShellCommandRunner> {
    Arc::new(ShellCommandRunner::new("bash", Arc::new(SystemTimeProvider)))
}

fn mount(widgets: Vec<WidgetSpec>, options: DashboardOptions) -> MountedDashboard {
    Dashboard::mount(
        DashboardSpec::new(widgets),
        runner(),
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
        options,
    )
    .unwrap()
}

fn scratch_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "dashpanel-it-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

/// Wait until `widget.poll` displays `expected`
async fn wait_for_value(dashboard: &MountedDashboard, widget: &str, poll: &str, expected: &str) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = dashboard.widget(widget).unwrap();
            if snapshot.field_value(poll) == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    assert!(
        result.is_ok(),
        "{}.{} never showed {:?} (last: {:?})",
        widget,
        poll,
        expected,
        dashboard.widget(widget).unwrap().field_value(poll)
    );
}

/// Test 1: Fallback until the first successful run, then the trimmed stdout
#[tokio::test]
async fn test_value_moves_from_fallback_to_stdout() {
    let level_file = scratch_file("volume-level");
    let script = format!("cat '{}'", level_file.display());

    let dashboard = mount(
        vec![WidgetSpec::new("volume", "Volume")
            .poll("level", PollSpec::new("0%", 50, script))
            .value("level")],
        DashboardOptions::default(),
    );

    // File missing: cat exits 1, fallback stays
    wait_for_value(&dashboard, "volume", "level", "0%").await;
    let state = dashboard.observe("volume", "level").unwrap().state();
    assert_ne!(state.outcome, PollOutcome::Success);

    std::fs::write(&level_file, "42%\n").unwrap();
    wait_for_value(&dashboard, "volume", "level", "42%").await;

    dashboard.unmount().await;
    let _ = std::fs::remove_file(level_file);

    println!("✅ Test 1: volume level 0% -> 42%");
}

/// Test 2: A failing pipeline stage shows the fallback, not partial output
#[tokio::test]
async fn test_network_speed_without_ip_tool_shows_fallback() {
    let network = catalog::builtin("network").unwrap();
    // Shadow `ip` with a failing function
    let script = format!("ip() {{ return 1; }}\n{}", network.polls["speed"].script);

    let dashboard = mount(
        vec![WidgetSpec::new("network", "Network")
            .poll("speed", PollSpec::new("↓ 0 KB/s ↑ 0 KB/s", 50, script))
            .field("Speed:", "speed")],
        DashboardOptions::default(),
    );

    let mut observer = dashboard.observe("network", "speed").unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while observer.state().outcome == PollOutcome::Pending {
            observer.changed().await;
        }
    })
    .await
    .expect("speed poll never completed");

    assert_eq!(observer.value(), "↓ 0 KB/s ↑ 0 KB/s");

    dashboard.unmount().await;
    println!("✅ Test 2: network speed falls back without `ip`");
}

/// Test 2b: `ip` present but no default route: the snippet prints the idle speed itself
#[tokio::test]
async fn test_network_speed_without_default_route() {
    let network = catalog::builtin("network").unwrap();
    let script = format!(
        "ip() {{ echo '10.0.0.0/24 dev eth0 proto kernel scope link'; }}\n{}",
        network.polls["speed"].script
    );

    let dashboard = mount(
        vec![WidgetSpec::new("network", "Network")
            .poll("speed", PollSpec::new("--", 50, script))
            .field("Speed:", "speed")],
        DashboardOptions::default(),
    );

    let mut observer = dashboard.observe("network", "speed").unwrap();
    let state = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = observer.state();
            if state.outcome != PollOutcome::Pending {
                return state;
            }
            observer.changed().await;
        }
    })
    .await
    .expect("speed poll never completed");

    assert_eq!(state.outcome, PollOutcome::Success);
    assert_eq!(state.value, "↓ 0 KB/s ↑ 0 KB/s");

    dashboard.unmount().await;
    println!("✅ Test 2b: network speed idle without a default route");
}

/// Test 3: A hanging snippet is killed at the timeout and the fallback shown
#[tokio::test]
async fn test_hanging_poll_times_out_to_fallback() {
    let dashboard = mount(
        vec![WidgetSpec::new("system", "System")
            .poll("cpu", PollSpec::new("0%", 50, "echo 12%; sleep 30"))
            .field("CPU:", "cpu")],
        DashboardOptions {
            poll_timeout: Duration::from_millis(200),
            ..DashboardOptions::default()
        },
    );

    let mut observer = dashboard.observe("system", "cpu").unwrap();
    let state = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match observer.changed().await {
                Some(state) if state.outcome == PollOutcome::Fallback => return state,
                Some(_) => continue,
                None => panic!("poller stopped"),
            }
        }
    })
    .await
    .expect("timed out poll never fell back");

    // Partial stdout of a killed run is discarded
    assert_eq!(state.value, "0%");
    assert!(dashboard.stats().poll_failures >= 1);

    dashboard.unmount().await;
    println!("✅ Test 3: hanging snippet killed, fallback shown");
}

/// Test 4: Recovery after a failure shows the new stdout again
#[tokio::test]
async fn test_poll_recovers_after_failure() {
    let flag = scratch_file("brightness-flag");
    let script = format!("[ ! -e '{}' ]\necho 80%", flag.display());

    let dashboard = mount(
        vec![WidgetSpec::new("brightness", "Brightness")
            .poll("level", PollSpec::new("0%", 50, script))
            .value("level")],
        DashboardOptions::default(),
    );

    wait_for_value(&dashboard, "brightness", "level", "80%").await;

    // Strict mode: the failed test aborts before echo
    std::fs::write(&flag, "").unwrap();
    wait_for_value(&dashboard, "brightness", "level", "0%").await;

    std::fs::remove_file(&flag).unwrap();
    wait_for_value(&dashboard, "brightness", "level", "80%").await;

    dashboard.unmount().await;
    println!("✅ Test 4: value recovers after a failing run");
}

/// Test 5: Standalone poller against bash; stop ends the task
#[tokio::test]
async fn test_standalone_poller_lifecycle() {
    let handle = Poller::new(
        "clock.time",
        PollSpec::new("--:--", 50, "printf '%s\\n\\n' 12:34"),
        runner(),
        Arc::new(SystemTimeProvider),
    )
    .start()
    .unwrap();

    let mut observer = handle.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), observer.changed())
        .await
        .expect("no first value")
        .expect("poller stopped early");
    assert_eq!(state.value, "12:34");
    assert_eq!(state.outcome, PollOutcome::Success);

    handle.shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), observer.closed())
        .await
        .expect("observer not closed after shutdown");

    println!("✅ Test 5: poller started and stopped");
}

/// Test 6: Stopping a poller mid-run kills what the snippet started
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_shutdown_mid_run_kills_snippet_children() {
    let pid_file = scratch_file("network-sleep-pid");
    let script = format!(
        "sleep 30 &\necho $! > '{}'\nwait\necho done",
        pid_file.display()
    );

    let handle = Poller::new(
        "network.speed",
        PollSpec::new("↓ 0 KB/s ↑ 0 KB/s", 1000, script),
        runner(),
        Arc::new(SystemTimeProvider),
    )
    .start()
    .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while !pid_file.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("snippet never started");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let sleep_pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    let _ = std::fs::remove_file(&pid_file);

    handle.shutdown().await;

    let gone = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let alive = std::fs::read_to_string(format!("/proc/{}/stat", sleep_pid))
                .map(|stat| {
                    !stat
                        .rsplit(')')
                        .next()
                        .is_some_and(|rest| rest.trim_start().starts_with('Z'))
                })
                .unwrap_or(false);
            if !alive {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(gone.is_ok(), "sleep {} outlived the poller", sleep_pid);

    println!("✅ Test 6: shutdown mid-run leaves no children behind");
}
