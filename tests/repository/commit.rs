use crate::common::{Sandbox, author_at, random_content, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use surge::areas::index::AddOutcome;
use surge::artifacts::objects::EMPTY_TREE_OID;
use surge::commands::porcelain::commit::CommitOptions;
use surge::errors::ErrorKind;

#[rstest]
#[tokio::test]
async fn nothing_staged_after_the_first_commit_is_an_empty_commit(sandbox: Sandbox) {
    sandbox.write("a.txt", &random_content());
    let first = sandbox.commit_all("first", 0).await;

    let error = sandbox.repository.commit("second", author_at(1)).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::EmptyCommit);
    assert_eq!(sandbox.head(), first);
}

#[rstest]
#[tokio::test]
async fn restaging_unchanged_content_is_an_empty_commit(sandbox: Sandbox) {
    sandbox.write("a.txt", "stable\n");
    sandbox.commit_all("first", 0).await;

    sandbox.repository.add_files(&["a.txt"]).await.unwrap();
    let error = sandbox.repository.commit("again", author_at(1)).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::EmptyCommit);
}

#[rstest]
#[tokio::test]
async fn restoring_head_content_unstages_the_file(sandbox: Sandbox) {
    sandbox.write("a.txt", "stable\n");
    sandbox.commit_all("first", 0).await;

    sandbox.write("a.txt", "edited\n");
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();
    sandbox.write("a.txt", "stable\n");
    let outcomes = sandbox.repository.add_files(&["a.txt"]).await.unwrap();

    assert_eq!(outcomes, vec![(PathBuf::from("a.txt"), AddOutcome::Unstaged)]);
    assert!(sandbox.repository.load_index().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn a_file_replacing_its_old_directory_is_committed(sandbox: Sandbox) {
    sandbox.write("a/b", "nested\n");
    sandbox.commit_all("first", 0).await;

    std::fs::remove_dir_all(sandbox.path().join("a")).unwrap();
    sandbox.write("a", "flat\n");
    sandbox.commit_all("flatten", 1).await;

    let files = sandbox.repository.head_files().unwrap();
    assert_eq!(files.keys().cloned().collect::<Vec<_>>(), vec![PathBuf::from("a")]);
    let (oid, _) = &files[std::path::Path::new("a")];
    assert_eq!(&sandbox.repository.database().get(oid).unwrap()[..], b"flat\n");
}

#[rstest]
#[tokio::test]
async fn an_empty_root_commit_must_be_requested(sandbox: Sandbox) {
    let refused = sandbox.repository.commit("root", author_at(0)).await.unwrap_err();
    assert_eq!(refused.kind(), ErrorKind::EmptyCommit);

    let oid = sandbox
        .repository
        .commit_with_options("root", author_at(0), CommitOptions { allow_empty_root: true })
        .await
        .unwrap();

    let commit = sandbox.repository.database().parse_object_as_commit(&oid).unwrap();
    assert_eq!(commit.tree_oid().as_ref(), EMPTY_TREE_OID);
}

#[rstest]
#[tokio::test]
async fn empty_root_is_only_allowed_for_the_first_commit(sandbox: Sandbox) {
    sandbox.write("a.txt", &random_content());
    sandbox.commit_all("first", 0).await;

    let error = sandbox
        .repository
        .commit_with_options("empty", author_at(1), CommitOptions { allow_empty_root: true })
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::EmptyCommit);
}

#[rstest]
#[tokio::test]
async fn blank_messages_are_rejected(sandbox: Sandbox) {
    sandbox.write("a.txt", &random_content());
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();

    let error = sandbox.repository.commit("  \n", author_at(0)).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
}

#[rstest]
#[tokio::test]
async fn each_commit_points_at_the_previous_tip(sandbox: Sandbox) {
    sandbox.write("a.txt", "one\n");
    let first = sandbox.commit_all("first", 0).await;
    sandbox.write("a.txt", "two\n");
    let second = sandbox.commit_all("second", 1).await;

    let commit = sandbox.repository.database().parse_object_as_commit(&second).unwrap();

    assert_eq!(commit.parents(), &[first]);
    assert_eq!(commit.author().name(), crate::common::AUTHOR_NAME);
    assert!(sandbox.repository.load_index().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn the_tree_overlays_staged_changes_on_head(sandbox: Sandbox) {
    sandbox.write("kept.txt", "kept\n");
    sandbox.write("edited.txt", "before\n");
    sandbox.commit_all("first", 0).await;

    sandbox.write("edited.txt", "after\n");
    sandbox.repository.add_files(&["edited.txt"]).await.unwrap();
    let oid = sandbox.repository.commit("edit", author_at(1)).await.unwrap();

    let files = sandbox.repository.database().commit_files(Some(&oid)).unwrap();
    assert_eq!(files.len(), 2);
    let (edited, _) = &files[std::path::Path::new("edited.txt")];
    assert_eq!(&sandbox.repository.database().get(edited).unwrap()[..], b"after\n");
}

#[rstest]
#[tokio::test]
async fn committing_on_a_detached_head_moves_only_head(sandbox: Sandbox) {
    sandbox.write("a.txt", "one\n");
    let first = sandbox.commit_all("first", 0).await;
    sandbox.repository.checkout(first.as_ref()).await.unwrap();

    sandbox.write("a.txt", "detached\n");
    let detached = sandbox.commit_all("detached work", 1).await;

    assert_eq!(sandbox.head(), detached);
    assert_eq!(sandbox.repository.resolve_commit("main").unwrap(), first);
}
