// tests/integration_test.rs
use std::process::Command;

fn gitflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gitflow"))
}

#[test]
fn test_gitflow_help() {
    let output = gitflow().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("gitflow"));
    assert!(stdout.contains("feature-start"));
    assert!(stdout.contains("make-versionless"));
    assert!(!stdout.contains("feature-integrate"));
}

#[test]
fn test_gitflow_version() {
    let output = gitflow().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_goal_argument_is_usage_error() {
    let output = gitflow().arg("set-version").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_version_fails_outside_repository() {
    let dir = tempfile::tempdir().unwrap();
    let output = gitflow()
        .args(["set-version", "1.2"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unknown_property_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = gitflow()
        .args(["-Dflow.unknown=true", "feature-rebase"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unknown property 'flow.unknown'"));
}
