/// CLI Integration Tests
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("abap-debug-bridge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote ABAP debugger session bridge"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("abap-debug-bridge").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("abap-debug-bridge"));
}

#[test]
fn test_cli_no_subcommand_fails() {
    let mut cmd = Command::cargo_bin("abap-debug-bridge").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_terminal_id_created_then_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ABAPDebugging").join("terminalId");

    let first = Command::cargo_bin("abap-debug-bridge")
        .unwrap()
        .args(["terminal-id", "--path"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    Command::cargo_bin("abap-debug-bridge")
        .unwrap()
        .args(["terminal-id", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(first.clone());

    let stored = std::fs::read_to_string(&path).unwrap();
    assert_eq!(format!("{}\n", stored).as_bytes(), first.as_slice());
}

#[test]
fn test_ide_id_is_deterministic() {
    let run = || {
        Command::cargo_bin("abap-debug-bridge")
            .unwrap()
            .args(["ide-id", "A4H"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(String::from_utf8(first).unwrap().trim().len(), 32);
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();

    Command::cargo_bin("abap-debug-bridge")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["ide-id", "A4H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}
