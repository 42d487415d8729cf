//! Integration tests for the overlord binary
//!
//! Runs the built executable end to end for the commands that exit on their own.

use std::process::Command;

fn overlord() -> Command {
    Command::new(env!("CARGO_BIN_EXE_overlord"))
}

// ============================================================================
// SCENARIOS COMMAND
// ============================================================================

#[test]
fn test_scenarios_json_lists_builtins() {
    let output = overlord()
        .args(["scenarios", "--json"])
        .env_remove("OVERLORD_SCENARIOS")
        .output()
        .unwrap();
    assert!(output.status.success());

    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["pegasus-bridge", "omaha-beach", "hedgerow-hell", "random"]);
}

#[test]
fn test_scenarios_bad_dir_fails() {
    let output = overlord()
        .args(["scenarios", "--dir", "/nonexistent/scenarios"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_scenarios_table() {
    let output = overlord()
        .arg("scenarios")
        .env_remove("OVERLORD_SCENARIOS")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("Omaha Beach"));
    assert!(text.contains("Random Encounter"));
}

// ============================================================================
// SERVE COMMAND
// ============================================================================

#[test]
fn test_serve_rejects_missing_scenario_dir() {
    let output = overlord()
        .args(["serve", "--port", "0", "--scenario-dir", "/nonexistent/scenarios"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_serve_rejects_unknown_rules() {
    let output = overlord()
        .args(["serve", "--rules", "chess"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
