use crate::common::{Sandbox, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeSet;
use std::path::PathBuf;
use surge::artifacts::status::file_change::IndexChangeType;

fn paths(names: &[&str]) -> BTreeSet<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[rstest]
#[tokio::test]
async fn a_fresh_repository_is_clean(sandbox: Sandbox) {
    assert!(sandbox.repository.status().unwrap().is_clean());
}

#[rstest]
#[tokio::test]
async fn reports_each_kind_of_change(sandbox: Sandbox) {
    sandbox.write("kept.txt", "kept\n");
    sandbox.write("edited.txt", "before\n");
    sandbox.write("deleted.txt", "doomed\n");
    sandbox.write("staged.txt", "v1\n");
    sandbox.commit_all("first", 0).await;

    sandbox.write("edited.txt", "after\n");
    std::fs::remove_file(sandbox.path().join("deleted.txt")).unwrap();
    sandbox.write("staged.txt", "v2\n");
    sandbox.write("brand-new.txt", "new\n");
    sandbox.write("added.txt", "added\n");
    sandbox.repository.add_files(&["staged.txt", "added.txt"]).await.unwrap();

    let status = sandbox.repository.status().unwrap();

    assert!(!status.is_clean());
    assert_eq!(status.modified, paths(&["edited.txt"]));
    assert_eq!(status.deleted, paths(&["deleted.txt"]));
    assert_eq!(status.untracked, paths(&["brand-new.txt"]));
    assert_eq!(
        status.staged.into_iter().collect::<Vec<_>>(),
        vec![
            (PathBuf::from("added.txt"), IndexChangeType::Added),
            (PathBuf::from("staged.txt"), IndexChangeType::Modified),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn ignored_files_are_not_untracked(sandbox: Sandbox) {
    sandbox.write("app.log", "noise\n");
    sandbox.write("target/debug/out", "binary\n");
    sandbox.write("main.rs", "fn main() {}\n");

    let status = sandbox.repository.status().unwrap();

    assert_eq!(status.untracked, paths(&["main.rs"]));
}

#[rstest]
#[tokio::test]
async fn status_does_not_touch_the_index(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();
    let before = std::fs::read(sandbox.repository.surge_path().join("index")).unwrap();

    sandbox.repository.status().unwrap();

    let after = std::fs::read(sandbox.repository.surge_path().join("index")).unwrap();
    assert_eq!(before, after);
}
