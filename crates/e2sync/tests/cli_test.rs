//! Integration tests for the `e2sync` CLI binary.
//!
//! Argument parsing, config handling and error exit codes, plus a few
//! end-to-end runs against a mocked preset server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `e2sync` binary with env isolation.
///
/// Clears all `E2SYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn e2sync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("e2sync");
    cmd.env("HOME", "/tmp/e2sync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/e2sync-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("E2SYNC_PROFILE")
        .env_remove("E2SYNC_SERVER")
        .env_remove("E2SYNC_PUSH_URL")
        .env_remove("E2SYNC_CONFIG")
        .env_remove("E2SYNC_OUTPUT")
        .env_remove("E2SYNC_TIMEOUT")
        .env_remove("E2SYNC_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mock_state(server: &MockServer, seq: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "seq": seq,
            "safe": true,
            "presets": {
                "10": { "title": "Ten" },
                "2": { "title": "Close", "group": "Cameras", "active": true },
                "1.1": { "title": "Slides", "group": "Screens" }
            }
        })))
        .mount(server)
        .await;
}

fn config_arg(dir: &Path) -> String {
    dir.join("config.toml").display().to_string()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = e2sync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    e2sync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("presets")
            .and(predicate::str::contains("autotrans"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    e2sync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("e2sync"));
}

#[test]
fn test_completions_bash() {
    e2sync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format_is_usage_error() {
    e2sync_cmd()
        .args(["status", "-o", "xml"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_server_configured() {
    let output = e2sync_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No server configured"), "got:\n{text}");
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let output = e2sync_cmd().args(["-p", "nope", "status"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_invalid_server_url_is_usage_error() {
    e2sync_cmd()
        .args(["--server", "ftp://e2.local", "status"])
        .assert()
        .code(2);
}

#[test]
fn test_connection_refused_exit_code() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    e2sync_cmd()
        .args(["--server", &format!("http://127.0.0.1:{port}"), "status"])
        .assert()
        .code(7);
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_init_then_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());

    e2sync_cmd()
        .args(["--config", &config, "config", "init", "--url", "e2.local:8080", "--name", "stage"])
        .assert()
        .success();

    e2sync_cmd()
        .args(["--config", &config, "config", "profiles", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stage"));

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("http://e2.local:8080/"), "got:\n{written}");
    assert!(written.contains(r#"default_profile = "stage""#), "got:\n{written}");

    // Second init with the same name needs --force.
    e2sync_cmd()
        .args(["--config", &config, "config", "init", "--url", "e2.local:9090", "--name", "stage"])
        .assert()
        .code(2);
}

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());

    e2sync_cmd()
        .args(["--config", &config, "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Against a mocked server ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_presets_json_sorted() {
    let server = MockServer::start().await;
    mock_state(&server, 5).await;

    let mut cmd = e2sync_cmd();
    cmd.args(["--server", &server.uri(), "presets", "-o", "json-compact"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let presets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = presets
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    // Ungrouped first, then groups sorted by title.
    assert_eq!(ids, ["10", "2", "1.1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_plain_prints_sequence() {
    let server = MockServer::start().await;
    mock_state(&server, 42).await;

    let mut cmd = e2sync_cmd();
    cmd.args(["--server", &server.uri(), "status", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "42");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_preset_activation_quotes_sequence() {
    let server = MockServer::start().await;
    mock_state(&server, 5).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/preset/1.1"))
        .and(body_json(json!({ "seq": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "seq": 6 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = e2sync_cmd();
    cmd.args(["--server", &server.uri(), "preset", "1.1", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "6");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_preset_is_not_found() {
    let server = MockServer::start().await;
    mock_state(&server, 5).await;

    let mut cmd = e2sync_cmd();
    cmd.args(["--server", &server.uri(), "preset", "99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_cut_exit_code() {
    let server = MockServer::start().await;
    mock_state(&server, 6).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/preset/"))
        .respond_with(ResponseTemplate::new(409).set_body_string("seq mismatch"))
        .mount(&server)
        .await;

    let mut cmd = e2sync_cmd();
    cmd.args(["--server", &server.uri(), "cut"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("seq mismatch"));
}
