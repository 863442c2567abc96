//! Common test utilities for TUI tests.

use std::process::Command;

/// Runs the workbench binary with the given arguments.
/// Returns (exit code, stdout, stderr).
pub fn run_workbench(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_workbench"))
        .args(args)
        .env_remove("WORKBENCH_URL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

/// Runs headless against the mock service with the given events.
pub fn run_events(events: &str, extra: &[&str]) -> (i32, String, String) {
    let mut args = vec![
        "--headless",
        "--mock-service",
        "--config",
        "/nonexistent/workbench/config.toml",
        "--events",
        events,
    ];
    args.extend_from_slice(extra);
    run_workbench(&args)
}
