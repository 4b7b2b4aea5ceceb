//! End-to-end tests for the `voicebot` binary.
// crates/voicebot-cli/tests/cli_commands.rs
// =============================================================================
// Module: CLI Command Tests
// Description: Runs the binary against temp configs and checks its output.
// Purpose: Ensure every subcommand emits stable JSON and exit codes.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

/// Configuration with a primary and backup application.
const CONFIG: &str = r#"
log_level = "ERROR"

[deployment]
account = "123456789012"
region = "us-east-1"

[bot]
bot_id = "B1"
alias_id = "A1"

[[handlers]]
name = "bot-handler"

[[handlers]]
name = "backup-handler"

[[applications]]
id = "sma-primary"
handler = "bot-handler"

[[applications]]
id = "sma-backup"
handler = "backup-handler"

[[phone_numbers]]
number = "+15555550100"

[[trunks]]
connector_id = "abcdef1234"
"#;

/// Path of the built binary.
fn voicebot_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_voicebot"))
}

/// Writes `content` into a temp directory.
fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voicebot.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

/// Runs the binary with `--config` and a clean environment.
fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(voicebot_bin())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("VOICEBOT_CONFIG")
        .env_remove("VOICEBOT_ACCOUNT")
        .env_remove("VOICEBOT_REGION")
        .env_remove("LOG_LEVEL")
        .env_remove("PHONE_NUMBER_STATE")
        .output()
        .unwrap()
}

/// Parses stdout as one JSON document.
fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn config_validate_reports_success() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(&path, &["config", "validate"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Config valid.");
}

#[test]
fn config_validate_reports_failure() {
    let (_dir, path) = write_config(&CONFIG.replace("[bot]\nbot_id = \"B1\"\nalias_id = \"A1\"\n", ""));
    let output = run(&path, &["config", "validate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}

#[test]
fn topology_build_prints_outputs_and_fingerprint() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(&path, &["topology", "build"]);
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["outputs"]["phone_numbers"][0], "+15555550100");
    assert_eq!(report["outputs"]["voice_connector_ids"][0], "abcdef1234");
    assert_eq!(
        report["outputs"]["bot_alias_arn"],
        "arn:aws:lex:us-east-1:123456789012:bot-alias/B1/A1"
    );
    assert_eq!(report["fingerprint"]["algorithm"], "sha256");

    let again = stdout_json(&run(&path, &["topology", "build"]));
    assert_eq!(report["fingerprint"], again["fingerprint"]);
}

#[test]
fn topology_policy_prints_bot_access_statement() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(&path, &["topology", "policy"]);
    assert!(output.status.success());
    let policy = stdout_json(&output);
    let statement = &policy["Statement"][0];
    assert_eq!(statement["Sid"], "AllowChimePstnAudioUseBot");
    assert_eq!(statement["Action"], "lex:StartConversation");
    assert_eq!(
        statement["Condition"]["StringEquals"]["AWS:SourceAccount"],
        "123456789012"
    );
}

#[test]
fn route_reaches_primary_application() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(&path, &["route", "--to", "+15555550100", "--caller", "+15555550111"]);
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["outcome"], "accepted");
    assert_eq!(report["application"], "sma-primary");
    assert_eq!(report["invocations"].as_array().unwrap().len(), 1);
    assert_eq!(report["actions"][1]["Parameters"]["LocaleId"], "en_US");
}

#[test]
fn route_fails_over_past_unavailable_application() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(
        &path,
        &["route", "--host", "abcdef1234.voiceconnector.chime.aws", "--unavailable", "sma-primary"],
    );
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["application"], "sma-backup");
    assert_eq!(report["priority"], 2);
    assert_eq!(report["failed"][0]["application"], "sma-primary");
}

#[test]
fn unmatched_route_fails() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(&path, &["route", "--to", "+15555550199"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Call not routed"));
}

#[test]
fn authorize_allows_application_in_deploy_region() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(
        &path,
        &[
            "authorize",
            "--source-account",
            "123456789012",
            "--source-arn",
            "arn:aws:voiceconnector:us-east-1:123456789012:sma/sma-primary",
        ],
    );
    assert!(output.status.success());
    let decision = stdout_json(&output);
    assert_eq!(decision["decision"], "allow");
    assert_eq!(decision["sid"], "AllowChimePstnAudioUseBot");
}

#[test]
fn authorize_denies_foreign_account() {
    let (_dir, path) = write_config(CONFIG);
    let output = run(
        &path,
        &[
            "authorize",
            "--source-account",
            "210987654321",
            "--source-arn",
            "arn:aws:voiceconnector:us-east-1:210987654321:sma/sma-primary",
        ],
    );
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["decision"], "deny");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Authorization denied"));
}

#[test]
fn audit_log_receives_route_events() {
    let (dir, path) = write_config(&CONFIG.replace("\"ERROR\"", "\"DEBUG\""));
    let log = dir.path().join("audit.log");
    let output = run(
        &path,
        &["--audit-log", log.to_str().unwrap(), "route", "--to", "+15555550100"],
    );
    assert!(output.status.success());
    let events: Vec<String> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        events,
        ["topology_built", "route_resolution", "authorization_decision", "handler_attempt"]
    );
}
