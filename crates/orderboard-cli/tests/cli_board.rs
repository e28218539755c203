//! CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory, so the
//! board is stored in a fresh local snapshot.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_orderboard"))
        .args(args)
        .env("ORDERBOARD_HOME", home)
        .env_remove("ORDERBOARD_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn add_order(home: &Path, resource: &str, start: &str, duration: &str) -> String {
    let out = run_ok(
        home,
        &[
            "order", "add", "--customer", "Acme", "--details", "Brackets", "--resource", resource,
            "--start", start, "--duration", duration,
        ],
    );
    let event: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(event["type"], "OrderCreated");
    event["order"]["id"].as_str().unwrap().to_string()
}

#[test]
fn order_lifecycle_persists_between_runs() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let id = add_order(home, "Machine A", "1700000000000", "1:30");

    let shown: serde_json::Value =
        serde_json::from_str(&run_ok(home, &["order", "show", &id])).unwrap();
    assert_eq!(shown["duration"], 1.5);
    assert_eq!(shown["dueTime"], 1_700_000_000_000i64 + 90 * 60_000);
    assert_eq!(shown["durationUnit"], "hours");

    let extended: serde_json::Value =
        serde_json::from_str(&run_ok(home, &["order", "extend", &id, "--hours", "2"])).unwrap();
    assert_eq!(extended["duration"], 3.5);

    run_ok(home, &["order", "complete", &id, "--result", "fail"]);
    let active: Vec<serde_json::Value> =
        serde_json::from_str(&run_ok(home, &["order", "list", "--json"])).unwrap();
    assert!(active.is_empty());
    let completed: Vec<serde_json::Value> =
        serde_json::from_str(&run_ok(home, &["order", "list", "--completed", "--json"])).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["result"], "fail");

    run_ok(home, &["order", "restore", &id]);
    let active: Vec<serde_json::Value> =
        serde_json::from_str(&run_ok(home, &["order", "list", "--json"])).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["result"], "fail");

    run_ok(home, &["order", "delete", &id]);
    let deleted_again: serde_json::Value =
        serde_json::from_str(&run_ok(home, &["order", "delete", &id])).unwrap();
    assert_eq!(deleted_again["removed"], false);
}

#[test]
fn invalid_input_exits_with_error() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let (_, stderr, code) = run_cli(
        home,
        &["order", "add", "--resource", "Machine A", "--duration", "abc"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "{stderr}");

    let (_, stderr, code) = run_cli(home, &["order", "extend", "missing", "--hours", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "{stderr}");

    let (_, _, code) = run_cli(home, &["order", "add", "--resource", "  "]);
    assert_eq!(code, 1);
}

#[test]
fn resources_add_remove_and_status() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    run_ok(home, &["resource", "add", "Lathe"]);
    let (_, _, code) = run_cli(home, &["resource", "add", "Lathe"]);
    assert_eq!(code, 1);
    run_ok(home, &["resource", "remove", "Machine B"]);

    let names = run_ok(home, &["resource", "list"]);
    assert_eq!(
        names.lines().collect::<Vec<_>>(),
        ["Machine A", "Operator C", "Lathe"]
    );

    let statuses: Vec<serde_json::Value> =
        serde_json::from_str(&run_ok(home, &["resource", "list", "--status", "--json"])).unwrap();
    assert_eq!(statuses.len(), 3);
    assert!(statuses.iter().all(|s| s["busy"] == false));
}

#[test]
fn timeline_shows_day_rows() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();
    add_order(home, "Machine A", "2024-03-01T08:00", "2");

    let out: serde_json::Value = serde_json::from_str(&run_ok(
        home,
        &["timeline", "show", "--date", "2024-03-01", "--zoom", "6", "--json"],
    ))
    .unwrap();
    assert_eq!(out["zoomHours"], 6);
    assert_eq!(out["scaleFactor"], 4.0);
    let rows = out["rows"].as_array().unwrap();
    assert_eq!(rows[0]["key"], "Machine A");
    assert_eq!(rows[0]["blocks"][0]["offset_hours"], 8.0);

    let by_customer: serde_json::Value = serde_json::from_str(&run_ok(
        home,
        &["timeline", "show", "--date", "2024-03-01", "--group-by", "customer", "--json"],
    ))
    .unwrap();
    assert_eq!(by_customer["rows"].as_array().unwrap().len(), 1);
    assert_eq!(by_customer["rows"][0]["key"], "Acme");
}

#[test]
fn timeline_steps_day_and_zoom() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();
    add_order(home, "Machine A", "2024-03-02T08:00", "2");

    let out: serde_json::Value = serde_json::from_str(&run_ok(
        home,
        &[
            "timeline", "show", "--date", "2024-03-01", "--shift", "1", "--zoom", "12",
            "--zoom-step", "-4", "--json",
        ],
    ))
    .unwrap();
    assert_eq!(out["date"], "2024-03-02");
    assert_eq!(out["zoomHours"], 8);
    assert_eq!(out["rows"][0]["blocks"][0]["offset_hours"], 8.0);

    let clamped: serde_json::Value = serde_json::from_str(&run_ok(
        home,
        &["timeline", "show", "--zoom", "24", "--zoom-step", "6", "--json"],
    ))
    .unwrap();
    assert_eq!(clamped["zoomHours"], 24);
}

#[test]
fn overdue_order_is_announced_once() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();
    add_order(home, "Machine A", "1000", "1");

    let (stdout, stderr, code) = run_cli(home, &["timer", "status"]);
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["events"][0]["type"], "OrderOverdue");
    assert!(stderr.contains("Order overdue: Acme"), "{stderr}");

    let (stdout, stderr, _) = run_cli(home, &["timer", "status"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(report["events"].as_array().unwrap().is_empty());
    assert!(!stderr.contains("Order overdue"));
}

#[test]
fn duration_helpers() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let parsed: serde_json::Value =
        serde_json::from_str(&run_ok(home, &["duration", "parse", "1:30"])).unwrap();
    assert_eq!(parsed["minutes"], 90.0);
    assert_eq!(parsed["hours"], "1.5");
    assert_eq!(parsed["clock"], "1:30");

    assert_eq!(run_ok(home, &["duration", "adjust", "1:30", "--hours", "1"]).trim(), "2:30");
    assert_eq!(run_ok(home, &["duration", "adjust", "0.5", "--hours", "-2"]).trim(), "0.01");
}

#[test]
fn config_get_set_reset() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    assert_eq!(run_ok(home, &["config", "get", "timeline.zoom_hours"]).trim(), "12");
    run_ok(home, &["config", "set", "timeline.zoom_hours", "8"]);
    assert_eq!(run_ok(home, &["config", "get", "timeline.zoom_hours"]).trim(), "8");

    let (_, stderr, code) = run_cli(home, &["config", "set", "timer.bogus", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"), "{stderr}");

    run_ok(home, &["config", "reset"]);
    assert_eq!(run_ok(home, &["config", "get", "timeline.zoom_hours"]).trim(), "12");
}

#[test]
fn push_without_endpoint_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["sync", "push"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("sync.endpoint"), "{stderr}");
}
