//! CLI surface tests for the pipetrace binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_subcommands() {
    Command::cargo_bin("pipetrace")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("pipetrace")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pipetrace"));
}

#[test]
fn demo_prints_a_completed_trace() {
    let assert = Command::cargo_bin("pipetrace")
        .unwrap()
        .arg("demo")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let trace: serde_json::Value = serde_json::from_str(&stdout).expect("demo output is JSON");
    assert_eq!(trace["status"], "COMPLETED");
    assert_eq!(trace["steps"].as_array().unwrap().len(), 3);
    assert_eq!(
        trace["steps"][2]["output"]["selected_competitor"]["asin"],
        "B0COMP01"
    );
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("pipetrace")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}
