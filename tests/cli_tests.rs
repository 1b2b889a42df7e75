//! Binary-level CLI tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_subcommand() {
    Command::cargo_bin("podlift")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("start"))
                .and(predicate::str::contains("stop"))
                .and(predicate::str::contains("ps"))
                .and(predicate::str::contains("check")),
        );
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("podlift")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("podlift"));
}

#[test]
fn create_requires_a_template_name() {
    Command::cargo_bin("podlift")
        .unwrap()
        .args(["create", "infer1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--template-name"));
}

#[test]
fn create_requires_an_application_name() {
    Command::cargo_bin("podlift")
        .unwrap()
        .args(["create", "--template-name", "rag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("podlift")
        .unwrap()
        .arg("destroy")
        .assert()
        .failure();
}

#[test]
fn bad_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("podlift.toml");
    std::fs::write(&path, "runtime = \"mainframe\"\n").unwrap();

    Command::cargo_bin("podlift")
        .unwrap()
        .args(["ps", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
