//! Integration test: the `async-naming` binary's `check` exit status.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A repository containing one misleading method name.
fn project() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    fs::create_dir(dir.path().join(".git")).expect("create .git");
    fs::create_dir(dir.path().join("src")).expect("create src");
    fs::write(
        dir.path().join("src/lib.rs"),
        "pub fn loadAsync() {}\n\npub async fn saveAsync() {}\n",
    )
    .expect("write source");
    dir
}

fn check(root: &Path) -> Output {
    let global = TempDir::new().expect("create global dir");
    Command::new(env!("CARGO_BIN_EXE_async-naming"))
        .args(["check", "--format", "compact"])
        .arg(root)
        .env("ASYNC_NAMING_CONFIG_DIR", global.path())
        .output()
        .expect("run async-naming")
}

#[test]
fn warnings_pass_by_default() {
    let dir = project();
    let output = check(dir.path());

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains("src/lib.rs:1:8: warning [AvoidAsyncSuffix]"), "{stdout}");
}

#[test]
fn fail_on_warning_exits_nonzero() {
    let dir = project();
    fs::write(dir.path().join("async-naming.toml"), "fail_on = \"warning\"\n")
        .expect("write config");

    let output = check(dir.path());
    assert_eq!(output.status.code(), Some(1), "{output:?}");
}

#[test]
fn error_severity_exits_nonzero() {
    let dir = project();
    fs::write(
        dir.path().join(".async-naming.toml"),
        "[rules.avoid-async-suffix]\nseverity = \"error\"\n",
    )
    .expect("write config");

    let output = check(dir.path());
    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("error [AvoidAsyncSuffix]"));
}

#[test]
fn clean_project_passes() {
    let dir = project();
    fs::write(dir.path().join("src/lib.rs"), "pub fn load() {}\n").expect("write source");

    let output = check(dir.path());
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());
}
