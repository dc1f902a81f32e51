//! CLI Tests
//!
//! Runs the `hsgen` binary against host descriptions written to a
//! temporary directory.

mod common;

use assert_cmd::Command;
use common::{complete_host, required_marks_only, write_host};
use hsgen_mark::Mark;
use predicates::prelude::*;
use tempfile::TempDir;

fn hsgen() -> Command {
    let mut cmd = Command::cargo_bin("hsgen").unwrap();
    cmd.env_remove("HSGEN_CONFIG")
        .env_remove("HSGEN_VERBOSE")
        .env_remove("HSGEN_LOG");
    cmd
}

// ============================================================================
// CHECK
// ============================================================================

#[test]
fn test_check_complete_host() {
    let dir = TempDir::new().unwrap();
    let path = write_host(dir.path(), &complete_host());

    hsgen()
        .arg("--config")
        .arg(&path)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("VERIFIED_ENTRY"))
        .stdout(predicate::str::contains("Entry barrier: yes"));
}

#[test]
fn test_check_example_host() {
    let example =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../host.example.toml");

    hsgen()
        .arg("--config")
        .arg(example)
        .args(["check", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"method_handle_deopt\": true"));
}

#[test]
fn test_check_finds_config_in_current_dir() {
    let dir = TempDir::new().unwrap();
    write_host(dir.path(), &required_marks_only());

    hsgen()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("not exported (optional)"))
        .stdout(predicate::str::contains("Entry barrier: no"));
}

#[test]
fn test_check_config_from_env() {
    let dir = TempDir::new().unwrap();
    let path = write_host(dir.path(), &complete_host());

    hsgen()
        .env("HSGEN_CONFIG", &path)
        .arg("check")
        .assert()
        .success();
}

#[test]
fn test_check_json() {
    let dir = TempDir::new().unwrap();
    let path = write_host(dir.path(), &complete_host());

    let output = hsgen()
        .arg("--config")
        .arg(&path)
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["marks"].as_array().unwrap().len(), Mark::COUNT);
    assert_eq!(report["entry_barrier"], serde_json::Value::Bool(true));
}

#[test]
fn test_check_incomplete_host_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = complete_host();
    config.marks.shift_remove(&Mark::CardTableAddress.constant_key());
    let path = write_host(dir.path(), &config);

    hsgen()
        .arg("--config")
        .arg(&path)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("MISSING"))
        .stderr(predicate::str::contains("CARD_TABLE_ADDRESS"));
}

#[test]
fn test_check_missing_stub_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = complete_host();
    config.stubs.shift_remove("load_barrier_on_oop_array");
    let path = write_host(dir.path(), &config);

    hsgen()
        .arg("--config")
        .arg(&path)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("load_barrier_on_oop_array"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();

    hsgen()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Host description not found"));
}

// ============================================================================
// SIMULATE
// ============================================================================

#[test]
fn test_simulate_lock_depths() {
    let dir = TempDir::new().unwrap();
    let path = write_host(dir.path(), &complete_host());

    hsgen()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "--method", "Foo.bar()V", "--depths", "0,1,3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lock[2]"))
        .stdout(predicate::str::contains("lock[3]"))
        .stdout(predicate::str::contains("lock[4]").not())
        .stdout(predicate::str::contains("store_barrier_on_oop_field_with_healing"));
}

#[test]
fn test_simulate_json() {
    let dir = TempDir::new().unwrap();
    let path = write_host(dir.path(), &complete_host());

    let output = hsgen()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "-m", "Foo.bar()V", "-d", "2", "-n", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 3);
    let mut counts: Vec<_> = summaries.iter().map(|s| s["count"].as_u64().unwrap()).collect();
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2, 3]);
    assert_eq!(summaries[0]["lock_slots"].as_array().unwrap().len(), 3);
}

#[test]
fn test_simulate_recompilation_limit_exits_process() {
    let dir = TempDir::new().unwrap();
    let mut config = complete_host();
    config.compiler.compilation_count_limit = 2;
    let path = write_host(dir.path(), &config);

    hsgen()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "--method", "Hot.loop()V", "--count", "3"])
        .assert()
        .code(255)
        .stderr(predicate::str::contains("exceeding the limit of 2"));
}

#[test]
fn test_simulate_within_limit() {
    let dir = TempDir::new().unwrap();
    let mut config = complete_host();
    config.compiler.compilation_count_limit = 3;
    let path = write_host(dir.path(), &config);

    hsgen()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "--method", "Hot.loop()V", "--count", "3"])
        .assert()
        .success();
}

#[test]
fn test_simulate_reports_each_failed_compilation() {
    let dir = TempDir::new().unwrap();
    let mut config = complete_host();
    config.stubs.shift_remove("store_barrier_on_oop_field_with_healing");
    let path = write_host(dir.path(), &config);

    hsgen()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "--method", "Foo.bar()V", "--count", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("compilation request 0 failed"))
        .stderr(predicate::str::contains("compilation request 1 failed"))
        .stderr(predicate::str::contains("2 of 2 compilations failed"));
}
