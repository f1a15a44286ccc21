//! Integration tests for the `init` command.
//!
//! These tests verify the end-to-end behavior of the init command,
//! including repository discovery from subdirectories.

use tempfile::TempDir;

mod common;
use common::{felt_err, felt_ok, run_felt_in_dir};

// ============================================================================
// Init Command Integration Tests
// ============================================================================

#[test]
fn test_init_creates_felt_directory() {
    let temp_dir = TempDir::new().unwrap();

    let stdout = felt_ok(temp_dir.path(), &["init"]);
    assert_eq!(stdout, "Initialized .felt/");

    let felt_dir = temp_dir.path().join(".felt");
    assert!(felt_dir.is_dir(), ".felt should be a directory");
    assert!(felt_dir.join("config.yaml").is_file());
}

#[test]
fn test_init_twice_fails() {
    let temp_dir = TempDir::new().unwrap();
    felt_ok(temp_dir.path(), &["init"]);

    let stderr = felt_err(temp_dir.path(), &["init"]);
    assert!(stderr.contains(".felt directory already exists"), "got: {stderr}");
}

#[test]
fn test_init_json_reports_paths() {
    let temp_dir = TempDir::new().unwrap();
    let stdout = felt_ok(temp_dir.path(), &["--json", "init"]);

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["felt_dir"].as_str().unwrap().ends_with(".felt"));
    assert!(json["config_file"].as_str().unwrap().ends_with("config.yaml"));
}

#[test]
fn test_commands_fail_outside_repository() {
    let temp_dir = TempDir::new().unwrap();

    let stderr = felt_err(temp_dir.path(), &["ls"]);
    assert!(stderr.contains("felt init"), "got: {stderr}");
}

#[test]
fn test_repository_found_from_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    felt_ok(temp_dir.path(), &["init"]);
    let nested = temp_dir.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    let output = run_felt_in_dir(&nested, &["add", "From below", "--body", ""]);
    assert!(output.status.success());

    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(temp_dir.path().join(".felt").join(format!("{id}.md")).is_file());
}
