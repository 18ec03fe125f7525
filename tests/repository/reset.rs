use crate::common::{Sandbox, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use surge::artifacts::objects::object_id::ObjectId;
use surge::commands::porcelain::reset::ResetMode;

/// Two commits on main; returns the first
async fn two_commits(sandbox: &Sandbox) -> ObjectId {
    sandbox.write("a.txt", "one\n");
    let first = sandbox.commit_all("first", 0).await;
    sandbox.write("a.txt", "two\n");
    sandbox.write("b.txt", "added later\n");
    sandbox.commit_all("second", 1).await;

    first
}

#[rstest]
#[tokio::test]
async fn soft_reset_only_moves_the_branch(sandbox: Sandbox) {
    let first = two_commits(&sandbox).await;

    let oid = sandbox.repository.reset("HEAD^", ResetMode::Soft).await.unwrap();

    assert_eq!(oid, first);
    assert_eq!(sandbox.repository.resolve_commit("main").unwrap(), first);
    assert_eq!(sandbox.read("a.txt"), "two\n");
    assert!(sandbox.exists("b.txt"));
}

#[rstest]
#[tokio::test]
async fn mixed_reset_drops_staged_changes(sandbox: Sandbox) {
    let first = two_commits(&sandbox).await;
    sandbox.write("a.txt", "three\n");
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();

    sandbox.repository.reset(first.as_ref(), ResetMode::Mixed).await.unwrap();

    assert!(sandbox.repository.load_index().unwrap().is_empty());
    assert_eq!(sandbox.read("a.txt"), "three\n");

    let status = sandbox.repository.status().unwrap();
    assert!(status.modified.contains(&PathBuf::from("a.txt")));
    assert!(status.untracked.contains(&PathBuf::from("b.txt")));
}

#[rstest]
#[tokio::test]
async fn hard_reset_restores_the_working_copy(sandbox: Sandbox) {
    let first = two_commits(&sandbox).await;
    sandbox.write("a.txt", "scratch\n");
    sandbox.write("untracked.txt", "keep me\n");

    sandbox.repository.reset(first.as_ref(), ResetMode::Hard).await.unwrap();

    assert_eq!(sandbox.head(), first);
    assert_eq!(sandbox.read("a.txt"), "one\n");
    assert!(!sandbox.exists("b.txt"));
    assert_eq!(sandbox.read("untracked.txt"), "keep me\n");

    let status = sandbox.repository.status().unwrap();
    assert!(status.staged.is_empty());
    assert!(status.modified.is_empty());
}

#[rstest]
#[tokio::test]
async fn hard_reset_abandons_an_unfinished_merge(sandbox: Sandbox) {
    sandbox.write("f.txt", "base\n");
    let base = sandbox.commit_all("base", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();
    sandbox.write("f.txt", "main\n");
    let main_tip = sandbox.commit_all("main", 1).await;
    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("f.txt", "feature\n");
    sandbox.commit_all("feature", 2).await;
    sandbox.repository.checkout("main").await.unwrap();
    let _ = sandbox
        .repository
        .merge("feature", false, crate::common::author_at(3))
        .await;
    assert!(sandbox.repository.refs().read_merge_head().unwrap().is_some());

    sandbox.repository.reset("HEAD", ResetMode::Hard).await.unwrap();

    assert_eq!(sandbox.repository.refs().read_merge_head().unwrap(), None);
    assert_eq!(sandbox.head(), main_tip);
    assert_eq!(sandbox.read("f.txt"), "main\n");
    assert!(sandbox.repository.status().unwrap().is_clean());
    assert_ne!(base, main_tip);
}
