//! Binary exit codes and argument handling
//!
//! None of these reach the network: each case fails or finishes before the
//! first request.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn buncli() -> Command {
    let mut cmd = Command::cargo_bin("buncli").expect("binary is built");
    cmd.env_remove("BUN_ZONE")
        .env_remove("BUN_KEY")
        .env_remove("BUN_ENDPOINT")
        .env_remove("BUN_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_with_help_code() {
    buncli()
        .arg("--help")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn test_version_exits_with_help_code() {
    buncli()
        .arg("--version")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_verb_is_argument_error() {
    buncli().arg("frobnicate").assert().code(2);
}

#[test]
fn test_missing_zone() {
    buncli()
        .args(["--key", "secret", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BUN_ZONE"));
}

#[test]
fn test_missing_key() {
    buncli()
        .args(["list"])
        .env("BUN_ZONE", "myzone")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Key not defined. Either pass the key as an argument or set the BUN_KEY environment variable.",
        ));
}

#[test]
fn test_sync_requires_direction() {
    buncli()
        .args(["-z", "zone", "-k", "key", "sync"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_sync_direction() {
    let dir = TempDir::new().expect("create tempdir");
    buncli()
        .args(["-z", "zone", "-k", "key", "--endpoint", "http://127.0.0.1:9"])
        .args(["s", "-d", "sideways", "-p"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid sync direction 'sideways'"));
}

#[test]
fn test_sync_root_must_exist() {
    let dir = TempDir::new().expect("create tempdir");
    buncli()
        .args(["-z", "zone", "-k", "key", "sync", "-d", "up", "-p"])
        .arg(dir.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_invalid_endpoint() {
    buncli()
        .args(["-z", "zone", "-k", "key", "--endpoint", "not a url", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid endpoint"));
}

#[test]
fn test_upload_path_must_exist() {
    let dir = TempDir::new().expect("create tempdir");
    buncli()
        .args(["-z", "zone", "-k", "key", "--endpoint", "http://127.0.0.1:9", "upload", "-p"])
        .arg(dir.path().join("missing.txt"))
        .assert()
        .code(4);
}
