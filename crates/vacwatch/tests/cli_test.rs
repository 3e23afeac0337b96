//! Integration tests for the `vacwatch` binary.
//!
//! Every test gets its own config and state file in a temp dir; commands
//! that talk to the API run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn state(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    /// Write a state file pointing at `server` with the given baseline.
    fn seed(&self, server: &MockServer, last_count: Option<u64>) {
        let mut record = json!({
            "apiBase": format!("{}/api/v1", server.uri()),
            "title": "rust",
            "limit": 20,
            "intervalSeconds": 60,
            "enabled": true,
        });
        if let Some(count) = last_count {
            record["lastCount"] = json!(count);
        }
        std::fs::write(self.state(), record.to_string()).unwrap();
    }

    fn read_state(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(self.state()).unwrap()).unwrap()
    }

    /// `vacwatch` with env isolation and sandboxed files.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = bare_cmd(self.dir.path());
        cmd.arg("--config")
            .arg(self.config())
            .arg("--state-file")
            .arg(self.state());
        cmd
    }
}

/// Clears all `VACWATCH_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn bare_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vacwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("VACWATCH_CONFIG")
        .env_remove("VACWATCH_STATE_FILE")
        .env_remove("VACWATCH_API_BASE")
        .env_remove("VACWATCH_OUTPUT")
        .env_remove("VACWATCH_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_count(server: &MockServer, count: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": count })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let sandbox = Sandbox::new();
    let output = bare_cmd(sandbox.dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("poll")
                .and(predicate::str::contains("daemon"))
                .and(predicate::str::contains("vacancies"))
                .and(predicate::str::contains("settings")),
        );
}

#[test]
fn test_version_flag() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vacwatch"));
}

#[test]
fn test_completions_bash() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_output_format_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-o", "xml", "status"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_reports_overrides() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-o", "json", "config", "path"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(sandbox.config().display().to_string())
                .and(predicate::str::contains(sandbox.state().display().to_string())),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "init", "--defaults"])
        .assert()
        .success();
    assert!(sandbox.config().exists());

    sandbox
        .cmd()
        .args(["config", "init", "--defaults"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--force"));

    sandbox
        .cmd()
        .args(["config", "init", "--defaults", "--force"])
        .assert()
        .success();
}

#[test]
fn test_broken_config_is_a_config_error() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.config(), "[api]\ntimeout_secs = \"soon\"\n").unwrap();
    sandbox.cmd().arg("status").assert().code(3);
}

// ── Status & settings ───────────────────────────────────────────────

#[test]
fn test_status_without_history() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("never"));
}

#[test]
fn test_settings_show_defaults_as_json() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .args(["-o", "json", "settings", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["title"], "python");
    assert_eq!(settings["intervalSeconds"], 60);
}

#[test]
fn test_settings_set_rejects_bad_limit() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["settings", "set", "--limit", "0", "--no-push"])
        .assert()
        .code(6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_saves_and_survives_push_failure() {
    let server = MockServer::start().await;
    mount_count(&server, 3).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vacancies/polling-settings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, None);

    sandbox
        .cmd()
        .args(["settings", "set", "--title", "golang", "--interval", "120"])
        .assert()
        .success()
        .stderr(predicate::str::contains("local save kept"));

    let state = sandbox.read_state();
    assert_eq!(state["title"], "golang");
    assert_eq!(state["intervalSeconds"], 120);
    // The save is followed by one poll.
    assert_eq!(state["lastCount"], 3);
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_alerts_on_growth() {
    let server = MockServer::start().await;
    mount_count(&server, 15).await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, Some(10));

    sandbox
        .cmd()
        .args(["-o", "plain", "poll"])
        .assert()
        .success()
        .stdout(predicate::str::diff("15\n"))
        .stderr(predicate::str::contains("New vacancies: 5"));

    let state = sandbox.read_state();
    assert_eq!(state["lastCount"], 15);
    assert!(state["lastError"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_failure_keeps_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, Some(10));

    sandbox
        .cmd()
        .arg("poll")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("API error: 500"));

    let state = sandbox.read_state();
    assert_eq!(state["lastCount"], 10);
    assert_eq!(state["lastError"], "API error: 500");
    assert!(state["lastChecked"].is_string());
}

// ── Dashboard ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_vacancy_get_rejects_non_numeric_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, None);

    sandbox
        .cmd()
        .args(["vacancies", "get", "12abc"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("12abc"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vacancy_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/77"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Vacancy not found" })),
        )
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, None);

    sandbox
        .cmd()
        .args(["vacancies", "get", "77"])
        .assert()
        .code(5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vacancy_list_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies"))
        .and(query_param("title", "rust"))
        .and(query_param("is_active", "true"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "vacancy_id": 41,
                "title": "Rust developer",
                "source_url": "https://jobs.example/41",
                "company_id": 1,
                "experience_id": 2,
                "work_format_id": 1,
                "work_schedule_id": 1,
                "salary_from": 150000.0,
                "currency": "RUB"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&server, None);

    sandbox
        .cmd()
        .args(["-o", "plain", "vacancies", "list", "--title", "rust", "--page", "2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("41\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_base_flag_overrides_stored_base() {
    let stored = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overview": {
                "total_vacancies": 1200,
                "active_vacancies": 900,
                "total_companies": 40,
                "total_skills": 75
            },
            "salary": { "with_salary": 600, "average_salary": 180000.0 },
            "top_skills": [{ "skill": "Rust", "count": 120 }],
            "experience_distribution": []
        })))
        .expect(1)
        .mount(&other)
        .await;
    let sandbox = Sandbox::new();
    sandbox.seed(&stored, None);

    sandbox
        .cmd()
        .args(["--api-base", &format!("{}/api/v1", other.uri()), "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 200").and(predicate::str::contains("Rust")));
}

#[test]
fn test_unreachable_api_is_an_api_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--api-base", "http://127.0.0.1:9/api/v1", "stats"])
        .assert()
        .code(4);
}
