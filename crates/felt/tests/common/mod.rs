//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Run the felt binary in the specified directory.
///
/// Colors are disabled and the terminal width pinned so output is stable.
pub fn run_felt_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_felt"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("FELT_COLOR")
        .env_remove("FELT_ASCII")
        .env("FELT_MAX_WIDTH", "100")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute felt binary")
}

/// Run felt and return trimmed stdout, failing the test on a non-zero exit.
pub fn felt_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_felt_in_dir(dir, args);
    assert!(
        output.status.success(),
        "felt {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Run felt expecting failure and return its stderr.
pub fn felt_err(dir: &Path, args: &[&str]) -> String {
    let output = run_felt_in_dir(dir, args);
    assert!(
        !output.status.success(),
        "felt {args:?} unexpectedly succeeded: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Add a fiber and return its generated id.
pub fn add_fiber(dir: &Path, title: &str, extra: &[&str]) -> String {
    let mut args = vec!["add", title, "--body", ""];
    args.extend_from_slice(extra);
    felt_ok(dir, &args)
}
