//! Integration tests for the `parkwatch` CLI binary.
//!
//! Argument parsing, help, completions and config handling run without a
//! backend; the API-facing commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `parkwatch` with env isolation: every `PARKWATCH_*` variable cleared and
/// the config file pointed at `config`, which need not exist.
fn parkwatch_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("parkwatch");
    cmd.env("HOME", "/tmp/parkwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/parkwatch-cli-test-nonexistent")
        .env("PARKWATCH_CONFIG", config)
        .env_remove("PARKWATCH_PROFILE")
        .env_remove("PARKWATCH_API_URL")
        .env_remove("PARKWATCH_OUTPUT")
        .env_remove("PARKWATCH_TIMEOUT")
        .env_remove("RUST_LOG")
        .write_stdin("");
    cmd
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

fn alert(id: u64, acknowledged: bool) -> serde_json::Value {
    json!({
        "id": id,
        "device_code": "PK-001",
        "facility_name": "North Lot",
        "zone_name": "Level 1",
        "message": "Device offline",
        "severity": "CRITICAL",
        "acknowledged": acknowledged,
        "is_active": true,
        "created_at": "2024-03-09T08:00:00Z"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = parkwatch_cmd(&dir.path().join("config.toml")).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    parkwatch_cmd(&dir.path().join("config.toml"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("live")
                .and(predicate::str::contains("alerts"))
                .and(predicate::str::contains("export")),
        );
}

#[test]
fn version_flag() {
    let dir = tempfile::tempdir().unwrap();
    parkwatch_cmd(&dir.path().join("config.toml"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parkwatch"));
}

#[test]
fn completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    parkwatch_cmd(&dir.path().join("config.toml"))
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn bulk_ack_needs_ids_or_all() {
    let dir = tempfile::tempdir().unwrap();
    let output = parkwatch_cmd(&dir.path().join("config.toml"))
        .args(["alerts", "bulk-ack"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn watch_rejects_zero_interval() {
    let dir = tempfile::tempdir().unwrap();
    let output = parkwatch_cmd(&dir.path().join("config.toml"))
        .args(["live", "--watch", "--interval", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("interval"));
}

#[test]
fn unreachable_backend_exits_with_connection_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = parkwatch_cmd(&dir.path().join("config.toml"))
        .args(["--api-url", "http://127.0.0.1:1/api", "--timeout", "2", "zones"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    parkwatch_cmd(&config)
        .args(["config", "set", "facility", "3"])
        .assert()
        .success();
    parkwatch_cmd(&config)
        .args(["config", "set", "api_url", "http://backend:9000/api"])
        .assert()
        .success();

    parkwatch_cmd(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("facility = 3"))
                .and(predicate::str::contains("http://backend:9000/api")),
        );
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let output = parkwatch_cmd(&config)
        .args(["config", "set", "colour", "red"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!config.exists());
}

#[test]
fn config_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = parkwatch_cmd(&dir.path().join("config.toml"))
        .args(["config", "use", "site-b"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("site-b"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn zones_render_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/zones-performances/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 4,
            "name": "Level 1",
            "facility": "North Lot",
            "total_devices": 12,
            "occupied_slots": 7,
            "daily_capacity": null,
            "utilization_percentage": 58.3,
            "active_alerts": 1
        }])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "-o", "json", "zones"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["name"], "Level 1");
    assert_eq!(body[0]["occupied_slots"], 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn ack_of_missing_alert_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/alerts/99/acknowledge/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Alert not found"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "alerts", "ack", "99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Alert not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_ack_without_yes_is_refused_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alerts": [alert(5, false)],
            "total": 1,
            "unacknowledged": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/alerts/bulk-acknowledge/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "alerts", "bulk-ack", "5"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_ack_all_with_yes_skips_acknowledged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alerts": [alert(5, false), alert(6, true), alert(7, false)],
            "total": 3,
            "unacknowledged": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/alerts/bulk-acknowledge/"))
        .and(wiremock::matchers::body_json(json!({"alert_ids": [5, 7]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "acknowledged_count": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "--yes", "alerts", "bulk-ack", "--all"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Acknowledged 2 alert(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn export_with_no_rows_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/devices-hearbeat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("devices.csv");
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "export", "devices", "--out"])
        .arg(&out);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No data to export"));
    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn export_devices_to_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/devices-hearbeat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "code": "PK-001",
            "zone": "Level 1",
            "facility": "North Lot",
            "last_seen": null,
            "status": "CRITICAL",
            "health_score": 45,
            "active_alerts": []
        }])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("devices.csv");
    let mut cmd = parkwatch_cmd(&dir.path().join("config.toml"));
    cmd.args(["--api-url", &api_url(&server), "export", "devices", "--out"])
        .arg(&out);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Device Code,"));
    assert!(text.contains("PK-001"));
    assert!(text.contains("Never"));
}
