//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated config directory and no session from the environment
fn interview_bin(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("interview-capture").expect("binary is built");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("INTERVIEW_API_URL")
        .env_remove("INTERVIEW_AUTH_TOKEN")
        .env_remove("INTERVIEW_PASSWORD")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("interview"))
        .stdout(predicate::str::contains("jobs"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("applications"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("interview-capture"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    interview_bin(&home).assert().code(2);
}

#[test]
fn apply_help_lists_upload_option() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--upload"))
        .stdout(predicate::str::contains("--no-time-limit"));
}

#[test]
fn invalid_upload_spec_is_usage_error() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["apply", "job-1", "--upload", "answer.mp4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("N=PATH"));
}

#[test]
fn invalid_status_is_usage_error() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["applications", "status", "app-1", "hired"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid status"));
}

#[cfg(target_os = "linux")]
#[test]
fn apply_requires_login() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["apply", "job-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn unreachable_backend_is_reported() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["--api-url", "http://127.0.0.1:9/api", "jobs", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Network error"));
}

#[test]
fn config_help() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn config_unknown_key_is_usage_error() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["config", "set", "api_key", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown key"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_path_uses_xdg_home() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interview-capture"))
        .stdout(predicate::str::contains("config.toml"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["config", "set", "capture.width", "1280"])
        .assert()
        .success();

    interview_bin(&home)
        .args(["config", "get", "capture.width"])
        .assert()
        .success()
        .stdout("1280\n");

    interview_bin(&home)
        .args(["config", "get", "api_url"])
        .assert()
        .success()
        .stdout("(not set)\n");
}

#[cfg(target_os = "linux")]
#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    interview_bin(&home).args(["config", "init"]).assert().success();
    interview_bin(&home)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[cfg(target_os = "linux")]
#[test]
fn logout_without_session() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("No stored session"));
}

#[cfg(target_os = "linux")]
#[test]
fn whoami_without_session() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .arg("whoami")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn recruiter_registration_requires_company() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args([
            "register",
            "rita@example.com",
            "--user-type",
            "recruiter",
            "--password",
            "pw",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("company_name"));
}

#[test]
fn password_help_lists_reset_actions() {
    let home = TempDir::new().unwrap();
    interview_bin(&home)
        .args(["password", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("request-reset"))
        .stdout(predicate::str::contains("reset"));
}
