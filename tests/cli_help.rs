use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};

#[test]
fn prints_help() {
    let mut cmd = cargo_bin_cmd!("gitdeep");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("USAGE")));
}

#[test]
fn prints_version() {
    let mut cmd = cargo_bin_cmd!("gitdeep");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let mut cmd = cargo_bin_cmd!("gitdeep");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("<CMD>"));
}
