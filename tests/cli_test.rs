//! Integration tests for the orchestrator CLI.
//!
//! These exercise the argument and configuration error paths; batch
//! behavior itself is covered against the mock ledger in
//! `orchestrator_test.rs`.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("remit-orchestrator").unwrap();
    cmd.env_remove("LEDGER_API_URL")
        .env_remove("LEDGER_API_KEY")
        .env_remove("ACCOUNTS_FILE")
        .env_remove("TRANSFERS_FILE");
    cmd
}

#[test]
fn test_missing_command_fails_with_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing or unknown command"));
}

#[test]
fn test_unknown_command_fails_with_usage() {
    cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: remit-orchestrator"));
}

#[test]
fn test_transfer_requires_api_url() {
    cmd()
        .arg("transfer")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LEDGER_API_URL"));
}

#[test]
fn test_transfer_requires_api_key() {
    cmd()
        .arg("transfer")
        .env("LEDGER_API_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LEDGER_API_KEY"));
}

#[test]
fn test_requirements_validates_arguments_before_config() {
    cmd()
        .arg("requirements")
        .arg("US")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requirements <bank_country>"));
}

#[test]
fn test_verify_reports_missing_accounts_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("accounts.json");

    cmd()
        .arg("verify")
        .env("LEDGER_API_URL", "http://127.0.0.1:9")
        .env("LEDGER_API_KEY", "test-key")
        .env("ACCOUNTS_FILE", &missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}
