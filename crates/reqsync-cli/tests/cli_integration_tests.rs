//! CLI integration tests for reqsync
//!
//! Tests the reqsync binary end-to-end using assert_cmd. Every test gets
//! an isolated config directory so no real session or config is touched,
//! and none of them contact a server: they exercise parsing, the config
//! commands, and the session guard that fires before any request.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn reqsync_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reqsync").unwrap();
    cmd.env("REQSYNC_CONFIG_DIR", config_dir.path());
    cmd.env_remove("REQSYNC_API_URL");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("requirements"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_config_set_and_get_round_trip() {
    let dir = TempDir::new().unwrap();

    reqsync_cmd(&dir)
        .args(["config", "set", "api.base_url", "http://10.0.0.9:8000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set api.base_url"));

    reqsync_cmd(&dir)
        .args(["config", "get", "api.base_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.9:8000"));
}

#[test]
fn test_config_list_shows_defaults() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.base_url"))
        .stdout(predicate::str::contains("generation.timeout_secs = 120"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_rejects_zero_timeout() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["config", "set", "generation.timeout_secs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_config_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    reqsync_cmd(&dir)
        .args(["config", "set", "api.timeout_secs", "99"])
        .assert()
        .success();

    reqsync_cmd(&dir)
        .args(["config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"));

    reqsync_cmd(&dir)
        .args(["config", "get", "api.timeout_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));
}

#[test]
fn test_protected_commands_require_login() {
    let dir = TempDir::new().unwrap();
    let protected: [&[&str]; 6] = [
        &["whoami"],
        &["projects", "list"],
        &["requirements", "list"],
        &["select", "p1"],
        &["generate"],
        &["status"],
    ];

    for args in protected {
        reqsync_cmd(&dir)
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }
}

#[test]
fn test_logout_without_session_succeeds() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn test_document_without_cache_hints_at_generate() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["document"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No document generated yet"));
}

#[test]
fn test_requirements_create_requires_description() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["requirements", "create", "Title only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--description"));
}

#[test]
fn test_set_state_rejects_unknown_state_before_the_guard() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["requirements", "set-state", "r1", "Shipped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown state 'Shipped'"))
        .stderr(predicate::str::contains("Proposto"));
}

#[test]
fn test_doctor_reports_missing_session() {
    let dir = TempDir::new().unwrap();
    reqsync_cmd(&dir)
        .args(["doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session: Not logged in"));
}
