//! Integration tests for the `blinkd` binary.
//!
//! These tests exercise the CLI via `assert_cmd`, verifying the artifact
//! subcommands and the failure paths that need no hardware or daemon.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("blinkd")
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("blinkd"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_requires_a_subcommand() {
    cli().assert().failure();
}

// ── Artifact subcommands ──

#[test]
fn cli_policyfile_prints_default_names() {
    cli()
        .arg("policyfile")
        .assert()
        .success()
        .stdout(predicate::str::contains("org.blinkd.Indicator"))
        .stdout(predicate::str::contains("default_effect = \"deny\""));
}

#[test]
fn cli_policyfile_honors_name_overrides() {
    cli()
        .args(["-s", "com.example.Led", "-i", "com.example.LedIface", "policyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.Led"))
        .stdout(predicate::str::contains("com.example.LedIface"));
}

#[test]
fn cli_unitfile_prints_service_unit() {
    cli()
        .arg("unitfile")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Service]"))
        .stdout(predicate::str::contains("ExecStart="))
        .stdout(predicate::str::contains("WantedBy=sysinit.target"));
}

#[test]
fn cli_unitfile_carries_gpio_overrides() {
    cli()
        .args(["unitfile", "--chip", "gpiochip9", "--line", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--chip=gpiochip9"))
        .stdout(predicate::str::contains("--line=21"));
}

#[test]
fn cli_unitfile_defaults_elide_flags() {
    cli()
        .arg("unitfile")
        .assert()
        .success()
        .stdout(predicate::str::contains("--chip").not())
        .stdout(predicate::str::contains("--line").not());
}

// ── Client subcommands without a daemon ──

#[test]
fn cli_get_fails_when_daemon_not_running() {
    cli()
        .args(["--socket", "/tmp/blinkd-cli-test-missing.sock", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not running"));
}

#[test]
fn cli_set_fails_when_daemon_not_running() {
    cli()
        .args(["--socket", "/tmp/blinkd-cli-test-missing.sock", "set", "on"])
        .assert()
        .failure();
}

#[test]
fn cli_set_requires_an_action_argument() {
    cli().arg("set").assert().failure();
}

// ── Config file handling ──

#[test]
fn cli_missing_config_file_is_an_error() {
    cli()
        .args(["--config", "/nonexistent/blinkd.toml", "policyfile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn cli_config_file_parameterizes_artifacts() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("blinkd.toml");
    std::fs::write(
        &path,
        "[endpoint]\nservice_name = \"net.example.Blink\"\n",
    )
    .unwrap();

    cli()
        .args(["--config", path.to_str().unwrap(), "policyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("net.example.Blink"));
}

#[test]
fn cli_invalid_config_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("blinkd.toml");
    std::fs::write(&path, "[daemon]\npoll_timeout_ms = 0\n").unwrap();

    cli()
        .args(["--config", path.to_str().unwrap(), "policyfile"])
        .assert()
        .failure();
}
