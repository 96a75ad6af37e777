use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

fn crs(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("crs").expect("crs binary is built");
    cmd.arg("--data-dir").arg(temp_dir.path());
    cmd
}

// `crs` with no args should exit with a non-zero code.
#[test]
fn cli_no_args() {
    Command::cargo_bin("crs").unwrap().assert().failure();
}

// `crs -V` should print the version
#[test]
fn cli_version() {
    Command::cargo_bin("crs")
        .unwrap()
        .args(&["-V"])
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_crud() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    crs(&temp_dir)
        .args(&["add", r#"{"name": "Acme", "service": "hosting"}"#])
        .assert()
        .success()
        .stdout(contains("client created"))
        .stdout(contains(r#""id": 1"#));

    crs(&temp_dir)
        .args(&["get", "acme"])
        .assert()
        .success()
        .stdout(contains(r#""service": "hosting""#));

    crs(&temp_dir)
        .args(&["update", "1", r#"{"servicio": "email"}"#])
        .assert()
        .success()
        .stdout(contains(r#""service": "email""#));

    crs(&temp_dir)
        .args(&["rm", "1"])
        .assert()
        .success()
        .stdout(contains("client deleted"));

    crs(&temp_dir)
        .args(&["get", "1"])
        .assert()
        .failure()
        .stderr(contains("client not found: 1"));

    crs(&temp_dir)
        .args(&["list"])
        .assert()
        .success()
        .stdout(contains("[]"));
}

#[test]
fn cli_add_missing_fields() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    crs(&temp_dir)
        .args(&["add", r#"{"name": "Acme"}"#])
        .assert()
        .failure()
        .stderr(contains("400"));

    crs(&temp_dir)
        .args(&["add", "not json"])
        .assert()
        .failure();
}

#[test]
fn cli_engine_mismatch() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    crs(&temp_dir)
        .args(&["--engine", "named", "add", r#"{"name": "Acme"}"#])
        .assert()
        .success()
        .stdout(contains("unspecified"));

    crs(&temp_dir)
        .args(&["--engine", "indexed", "list"])
        .assert()
        .failure()
        .stderr(contains("does not match"));

    crs(&temp_dir)
        .args(&["get", "Acme"])
        .assert()
        .success()
        .stdout(contains("history"));
}
