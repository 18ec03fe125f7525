use crate::common::{repository_dir, surge_command, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;
use std::path::Path;

fn diverge(dir: &Path) {
    surge_command(dir).arg("init").assert().success();
    write_file(dir, "f.txt", "1\n2\n3\n4\n");
    surge_command(dir).args(["add", "."]).assert().success();
    surge_command(dir).args(["commit", "-m", "base"]).assert().success();
    surge_command(dir).args(["branch", "create", "feature"]).assert().success();

    write_file(dir, "f.txt", "1\n2\nmain\n4\n");
    surge_command(dir).args(["add", "f.txt"]).assert().success();
    surge_command(dir).args(["commit", "-m", "main"]).assert().success();

    surge_command(dir).args(["checkout", "feature"]).assert().success();
    write_file(dir, "f.txt", "1\n2\nfeature\n4\n");
    surge_command(dir).args(["add", "f.txt"]).assert().success();
    surge_command(dir).args(["commit", "-m", "feature"]).assert().success();
    surge_command(dir).args(["checkout", "main"]).assert().success();
}

#[rstest]
fn conflicts_are_reported_and_can_be_committed(repository_dir: TempDir) {
    let dir = repository_dir.path();
    diverge(dir);

    surge_command(dir)
        .args(["merge", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFLICT (content): merge conflict in f.txt"));

    surge_command(dir)
        .args(["status", "--short"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UU f.txt"));

    write_file(dir, "f.txt", "1\n2\nboth\n4\n");
    surge_command(dir).args(["add", "f.txt"]).assert().success();
    surge_command(dir).args(["commit", "-m", "resolved"]).assert().success();

    surge_command(dir)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge: "));
}

#[rstest]
fn a_hard_reset_abandons_the_merge(repository_dir: TempDir) {
    let dir = repository_dir.path();
    diverge(dir);
    surge_command(dir).args(["merge", "feature"]).assert().failure();

    surge_command(dir).args(["reset", "--hard"]).assert().success();

    assert_eq!(std::fs::read_to_string(dir.join("f.txt")).unwrap(), "1\n2\nmain\n4\n");
    surge_command(dir)
        .args(["status", "--short"])
        .assert()
        .success()
        .stdout("");
}
