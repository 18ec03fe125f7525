use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;
use surge::commands::porcelain::merge::MergeOutcome;

async fn disjoint_edits(sandbox: &Sandbox) {
    sandbox.write("x.txt", "x\n");
    sandbox.write("y.txt", "y\n");
    sandbox.commit_all("base", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();

    sandbox.write("y.txt", "y main\n");
    sandbox.commit_all("main edits y", 1).await;

    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("x.txt", "x feature\n");
    sandbox.commit_all("feature edits x", 2).await;

    sandbox.repository.checkout("main").await.unwrap();
}

#[rstest]
#[tokio::test]
async fn disjoint_files_merge_into_a_two_parent_commit(sandbox: Sandbox) {
    disjoint_edits(&sandbox).await;
    let main_tip = sandbox.head();
    let feature_tip = sandbox.repository.resolve_commit("feature").unwrap();

    let outcome = sandbox.repository.merge("feature", true, author_at(3)).await.unwrap();

    let MergeOutcome::Merged(merge_oid) = outcome else {
        panic!("expected a merge commit, got {outcome:?}");
    };
    assert_eq!(sandbox.head(), merge_oid);

    let database = sandbox.repository.database();
    let commit = database.parse_object_as_commit(&merge_oid).unwrap();
    assert_eq!(commit.parents(), &[main_tip, feature_tip]);
    assert_eq!(commit.message(), "Merge branch 'feature'");

    let files = database.commit_files(Some(&merge_oid)).unwrap();
    let content = |path: &str| {
        let (oid, _) = &files[Path::new(path)];
        String::from_utf8(database.get(oid).unwrap().to_vec()).unwrap()
    };
    assert_eq!(content("x.txt"), "x feature\n");
    assert_eq!(content("y.txt"), "y main\n");

    assert_eq!(sandbox.read("x.txt"), "x feature\n");
    assert!(sandbox.repository.status().unwrap().is_clean());
}

#[rstest]
#[tokio::test]
async fn merging_again_is_already_up_to_date(sandbox: Sandbox) {
    disjoint_edits(&sandbox).await;
    sandbox.repository.merge("feature", true, author_at(3)).await.unwrap();
    let merged = sandbox.head();

    let outcome = sandbox.repository.merge("feature", true, author_at(4)).await.unwrap();

    assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    assert_eq!(sandbox.head(), merged);
}

#[rstest]
#[tokio::test]
async fn a_branch_ahead_of_head_still_gets_a_merge_commit(sandbox: Sandbox) {
    sandbox.write("x.txt", "x\n");
    let base = sandbox.commit_all("base", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();
    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("x.txt", "x feature\n");
    let feature_tip = sandbox.commit_all("feature", 1).await;
    sandbox.repository.checkout("main").await.unwrap();

    let MergeOutcome::Merged(merge_oid) = sandbox.repository.merge("feature", false, author_at(2)).await.unwrap() else {
        panic!("expected a merge commit");
    };

    let commit = sandbox.repository.database().parse_object_as_commit(&merge_oid).unwrap();
    assert_eq!(commit.parents(), &[base, feature_tip]);
    assert_eq!(sandbox.read("x.txt"), "x feature\n");
}
