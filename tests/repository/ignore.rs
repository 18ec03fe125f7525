use crate::common::{Sandbox, sandbox, test_config};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use surge::areas::index::AddOutcome;
use surge::areas::repository::Repository;
use surge::artifacts::ignore::TrackEverything;

#[rstest]
#[tokio::test]
async fn a_named_ignored_file_is_skipped(sandbox: Sandbox) {
    sandbox.write("debug.log", "noise\n");

    let outcomes = sandbox.repository.add_files(&["debug.log"]).await.unwrap();

    assert_eq!(outcomes, vec![(PathBuf::from("debug.log"), AddOutcome::Ignored)]);
    assert!(sandbox.repository.load_index().unwrap().is_empty());
    assert_eq!(sandbox.object_count(), 0);
}

#[rstest]
#[tokio::test]
async fn adding_a_directory_leaves_ignored_files_out(sandbox: Sandbox) {
    sandbox.write("src/main.rs", "fn main() {}\n");
    sandbox.write("node_modules/pkg/index.js", "module\n");
    sandbox.write(".env", "SECRET=1\n");

    sandbox.repository.add_files(&["."]).await.unwrap();

    let staged = sandbox
        .repository
        .load_index()
        .unwrap()
        .entries()
        .map(|entry| entry.path.clone())
        .collect::<Vec<_>>();
    assert_eq!(staged, vec![PathBuf::from("src/main.rs")]);
}

#[rstest]
#[tokio::test]
async fn edited_rules_apply_after_reopening(sandbox: Sandbox) {
    std::fs::write(
        sandbox.repository.surge_path().join(".surgeignore"),
        "*.secret\n",
    )
    .unwrap();
    sandbox.write("key.secret", "hunter2\n");
    sandbox.write("app.log", "now tracked\n");

    let reopened = Repository::open(sandbox.path(), test_config()).unwrap();
    let status = reopened.status().unwrap();

    assert!(status.untracked.contains(&PathBuf::from("app.log")));
    assert!(!status.untracked.contains(&PathBuf::from("key.secret")));
}

#[rstest]
#[tokio::test]
async fn a_custom_predicate_replaces_the_rules(sandbox: Sandbox) {
    sandbox.write("debug.log", "noise\n");
    let repository = Repository::open(sandbox.path(), test_config())
        .unwrap()
        .with_ignore(Box::new(TrackEverything));

    let outcomes = repository.add_files(&["debug.log"]).await.unwrap();

    assert!(matches!(outcomes[0].1, AddOutcome::Staged(_)));
}
