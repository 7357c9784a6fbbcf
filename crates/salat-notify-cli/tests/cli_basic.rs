//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_salat-notify"))
        .args(args)
        .env("SALAT_NOTIFY_DATA_DIR", data_dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

fn break_config(data_dir: &Path) {
    std::fs::write(data_dir.join("config.toml"), "[audit\nbroken").unwrap();
}

#[test]
fn test_deliver_records_history_and_badge() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(
        dir.path(),
        &["deliver", "--id", "1", "--title", "Subuh", "--type", "0", "--channel", "prayer_critical_v10"],
    );
    assert_eq!(code, 0);
    let report = json(&out);
    assert_eq!(report["shown"], true);
    assert_eq!(report["duplicate"], false);
    assert!(report["recordId"].as_str().unwrap().starts_with("1_"));

    let (out, _, code) = run_cli(dir.path(), &["badge"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "1");

    let (out, _, code) = run_cli(dir.path(), &["history", "list", "--json"]);
    assert_eq!(code, 0);
    let records = json(&out);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["title"], "Subuh");
    assert_eq!(records[0]["type"], 0);
}

#[test]
fn test_mark_read_clears_badge() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, _) = run_cli(dir.path(), &["deliver", "--id", "2", "--title", "Dzuhur", "--type", "1"]);
    let id = json(&out)["recordId"].as_str().unwrap().to_string();

    let (out, _, code) = run_cli(dir.path(), &["history", "mark-read", &id]);
    assert_eq!(code, 0);
    assert!(out.contains("marked read"));
    assert!(out.contains("badge: 0"));

    let (out, _, _) = run_cli(dir.path(), &["history", "mark-read", "does-not-exist"]);
    assert!(out.contains("unchanged"));
}

#[test]
fn test_deliver_from_request_json() {
    let dir = tempfile::tempdir().unwrap();
    let request = r#"{"numericId":7,"title":"Dzikir Pagi","type":7,"channelKey":"dzikir_channel"}"#;
    let (out, _, code) = run_cli(dir.path(), &["deliver", "--request", request]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["shown"], true);
}

#[test]
fn test_boot_registers_single_job() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["boot"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(
        dir.path(),
        &["boot", "--action", "android.intent.action.QUICKBOOT_POWERON"],
    );
    assert_eq!(code, 0);

    let (out, _, code) = run_cli(dir.path(), &["jobs", "list"]);
    assert_eq!(code, 0);
    let jobs = json(&out);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["name"], "PrayerNotificationScheduler");
    assert_eq!(jobs[0]["interval_secs"], 21600);
}

#[test]
fn test_boot_ignores_unknown_action() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["boot", "--action", "android.intent.action.SCREEN_ON"]);
    assert_eq!(code, 0);
    assert!(out.contains("ignored"));
}

#[test]
fn test_tick_without_host_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    // Never scheduled, so stale; no entry point configured, so nothing to launch.
    let (out, _, code) = run_cli(dir.path(), &["tick"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "\"success\"");
}

#[test]
fn test_health_confirm_and_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["health", "confirm"]);
    assert_eq!(code, 0);

    let (out, _, _) = run_cli(dir.path(), &["health", "show"]);
    let health = json(&out);
    assert_eq!(health["needsReschedule"], false);
    assert_eq!(health["decision"], "fresh");

    run_cli(dir.path(), &["health", "flag", "set"]);
    let (out, _, _) = run_cli(dir.path(), &["health", "show"]);
    let health = json(&out);
    assert_eq!(health["needsReschedule"], true);
    assert_eq!(health["decision"], "stale");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["config", "get", "audit.stale_after_hours"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "24");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "audit.stale_after_hours", "48"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(dir.path(), &["config", "get", "audit.stale_after_hours"]);
    assert_eq!(out.trim(), "48");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_battery_status_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["battery", "status"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "true");

    run_cli(dir.path(), &["config", "set", "battery.optimization_exempt", "false"]);
    let (out, _, _) = run_cli(dir.path(), &["battery", "status"]);
    assert_eq!(out.trim(), "false");
}

#[test]
fn test_tick_with_broken_config_asks_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    break_config(dir.path());
    let (out, _, code) = run_cli(dir.path(), &["tick"]);
    assert_eq!(code, 75);
    assert_eq!(out.trim(), "\"retry\"");
}

#[test]
fn test_deliver_with_broken_config_still_shows() {
    let dir = tempfile::tempdir().unwrap();
    break_config(dir.path());
    let (out, _, code) = run_cli(dir.path(), &["deliver", "--id", "5", "--title", "Isya", "--type", "4"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["shown"], true);

    let db = salat_notify_core::Database::open_at(dir.path().join("salat-notify.db")).unwrap();
    assert_eq!(salat_notify_core::BadgeCounter::new(&db).current().unwrap(), 1);
}

#[test]
fn test_history_cap_rejects_values_above_limit() {
    let dir = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(dir.path(), &["config", "set", "history.max_entries", "150"]);
    assert_eq!(code, 1);
    assert!(err.contains("history.max_entries"));

    let (out, _, _) = run_cli(dir.path(), &["config", "get", "history.max_entries"]);
    assert_eq!(out.trim(), "100");
}

#[test]
fn test_default_channel_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(
        dir.path(),
        &["config", "set", "notifications.default_channel", "dzikir_critical_v10"],
    );
    let (_, _, code) = run_cli(dir.path(), &["deliver", "--id", "8", "--title", "Dzikir", "--type", "7"]);
    assert_eq!(code, 0);

    let db = salat_notify_core::Database::open_at(dir.path().join("salat-notify.db")).unwrap();
    let clock = salat_notify_core::FixedClock::new(0);
    let active = salat_notify_core::LocalPlatform::new(&db, &clock).active().unwrap();
    assert_eq!(active[0].channel_id, "dzikir_critical_v10");
}

#[test]
fn test_jobs_setup_registers_audit_job() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["jobs", "setup"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["name"], "PrayerNotificationScheduler");

    run_cli(dir.path(), &["jobs", "setup"]);
    let (out, _, _) = run_cli(dir.path(), &["jobs", "list"]);
    assert_eq!(json(&out).as_array().unwrap().len(), 1);
}

#[test]
fn test_boot_with_broken_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    break_config(dir.path());
    let (out, _, code) = run_cli(dir.path(), &["boot"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["interval_secs"], 21600);
}
