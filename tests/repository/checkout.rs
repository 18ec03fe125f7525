use crate::common::{Sandbox, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use surge::areas::refs::HeadTarget;
use surge::artifacts::branch::branch_name::BranchName;
use surge::errors::ErrorKind;

async fn two_branches(sandbox: &Sandbox) {
    sandbox.write("shared.txt", "shared\n");
    sandbox.write("main-only.txt", "main\n");
    sandbox.commit_all("base", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();

    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("shared.txt", "shared on feature\n");
    sandbox.write("feature/notes.txt", "notes\n");
    sandbox.repository.remove_files(&["main-only.txt"], false).await.unwrap();
    sandbox.commit_all("feature work", 1).await;
}

#[rstest]
#[tokio::test]
async fn switching_branches_rewrites_the_working_copy(sandbox: Sandbox) {
    two_branches(&sandbox).await;

    let target = sandbox.repository.checkout("main").await.unwrap();

    assert_eq!(target, HeadTarget::Branch(BranchName::try_parse("main").unwrap()));
    assert_eq!(sandbox.read("shared.txt"), "shared\n");
    assert_eq!(sandbox.read("main-only.txt"), "main\n");
    assert!(!sandbox.exists("feature/notes.txt"));
    assert!(!sandbox.exists("feature"));

    sandbox.repository.checkout("feature").await.unwrap();
    assert_eq!(sandbox.read("shared.txt"), "shared on feature\n");
    assert_eq!(sandbox.read("feature/notes.txt"), "notes\n");
    assert!(!sandbox.exists("main-only.txt"));
}

#[rstest]
#[tokio::test]
async fn any_other_revision_detaches_head(sandbox: Sandbox) {
    two_branches(&sandbox).await;
    let base = sandbox.repository.resolve_commit("feature^").unwrap();

    let target = sandbox.repository.checkout("feature^").await.unwrap();

    assert_eq!(target, HeadTarget::Detached(base.clone()));
    assert_eq!(sandbox.repository.refs().current_branch().unwrap(), None);
    assert_eq!(sandbox.head(), base);
    assert_eq!(sandbox.read("main-only.txt"), "main\n");
}

#[rstest]
#[tokio::test]
async fn staged_changes_block_checkout(sandbox: Sandbox) {
    two_branches(&sandbox).await;
    sandbox.write("shared.txt", "staged edit\n");
    sandbox.repository.add_files(&["shared.txt"]).await.unwrap();

    let error = sandbox.repository.checkout("main").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
    assert_eq!(sandbox.read("shared.txt"), "staged edit\n");
}

#[rstest]
#[tokio::test]
async fn local_edits_in_the_way_block_checkout(sandbox: Sandbox) {
    two_branches(&sandbox).await;
    sandbox.write("shared.txt", "unsaved edit\n");

    let error = sandbox.repository.checkout("main").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
    assert_eq!(sandbox.read("shared.txt"), "unsaved edit\n");
    assert_eq!(sandbox.repository.refs().current_branch().unwrap().unwrap().as_ref(), "feature");
}

#[rstest]
#[tokio::test]
async fn untracked_files_in_the_way_block_checkout(sandbox: Sandbox) {
    two_branches(&sandbox).await;
    sandbox.write("main-only.txt", "untracked here\n");

    let error = sandbox.repository.checkout("main").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
}

#[rstest]
#[tokio::test]
async fn unknown_targets_are_not_found(sandbox: Sandbox) {
    two_branches(&sandbox).await;

    let error = sandbox.repository.checkout("nowhere").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}
