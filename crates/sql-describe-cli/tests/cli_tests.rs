//! CLI integration tests for sql-describe.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that need no database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the sql-describe binary.
fn cmd() -> Command {
    Command::cargo_bin("sql-describe").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("health-check"))
        .stdout(predicate::str::contains("queries"));
}

#[test]
fn test_describe_subcommand_help() {
    cmd()
        .args(["describe", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<TABLE>"))
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sql-describe"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flags_and_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"))
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error, not a config error
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "describe", "users"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_database_type_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  type: oracle").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: app").unwrap();
    writeln!(file, "  user: svc").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "describe", "users"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn test_describe_requires_table() {
    cmd()
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TABLE>"));
}

// =============================================================================
// Queries Command Tests
// =============================================================================

#[test]
fn test_queries_needs_no_config() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "queries", "mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-- column query (mysql)"))
        .stdout(predicate::str::contains("-- bind order: 1=table, 2=schema"))
        .stdout(predicate::str::contains("information_schema"));
}

#[test]
fn test_queries_json_output() {
    cmd()
        .args(["--output-json", "queries", "pg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dialect\": \"postgres\""))
        .stdout(predicate::str::contains("\"kind\": \"index\""));
}

#[test]
fn test_queries_unknown_dialect_exits_with_code_1() {
    cmd()
        .args(["queries", "oracle"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown database type"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
