use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use surge::errors::{Error, ErrorKind};

/// main and feature both rewrite line 3 of `f.txt`
async fn diverged(sandbox: &Sandbox) {
    sandbox.write("f.txt", "1\n2\n3\n4\n");
    sandbox.commit_all("base", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();

    sandbox.write("f.txt", "1\n2\nmain\n4\n");
    sandbox.commit_all("main edit", 1).await;

    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("f.txt", "1\n2\nfeature\n4\n");
    sandbox.commit_all("feature edit", 2).await;

    sandbox.repository.checkout("main").await.unwrap();
}

#[rstest]
#[tokio::test]
async fn same_line_edits_stop_the_merge(sandbox: Sandbox) {
    diverged(&sandbox).await;
    let before = sandbox.head();

    let error = sandbox
        .repository
        .merge("feature", false, author_at(3))
        .await
        .unwrap_err();

    match &error {
        Error::ManualResolutionRequired { paths } => assert_eq!(paths, &vec![PathBuf::from("f.txt")]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sandbox.head(), before);

    let text = sandbox.read("f.txt");
    assert_eq!(
        text,
        "<<<<<<< main\n1\n2\nmain\n4\n=======\n1\n2\nfeature\n4\n>>>>>>> feature\n"
    );

    let status = sandbox.repository.status().unwrap();
    assert!(status.conflicted.contains(&PathBuf::from("f.txt")));
}

#[rstest]
#[tokio::test]
async fn committing_is_refused_until_conflicts_are_restaged(sandbox: Sandbox) {
    diverged(&sandbox).await;
    let main_tip = sandbox.head();
    let feature_tip = sandbox.repository.resolve_commit("feature").unwrap();
    let _ = sandbox.repository.merge("feature", false, author_at(3)).await;

    let refused = sandbox.repository.commit("merge", author_at(4)).await.unwrap_err();
    assert_eq!(refused.kind(), ErrorKind::ManualResolutionRequired);

    sandbox.write("f.txt", "1\n2\nmain and feature\n4\n");
    sandbox.repository.add_files(&["f.txt"]).await.unwrap();
    let merge_oid = sandbox.repository.commit("merge feature", author_at(4)).await.unwrap();

    let merge_commit = sandbox.repository.database().parse_object_as_commit(&merge_oid).unwrap();
    assert_eq!(merge_commit.parents(), &[main_tip, feature_tip]);
    assert_eq!(sandbox.repository.refs().read_merge_head().unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn another_merge_is_refused_while_one_is_unfinished(sandbox: Sandbox) {
    diverged(&sandbox).await;
    let _ = sandbox.repository.merge("feature", false, author_at(3)).await;

    let error = sandbox
        .repository
        .merge("feature", false, author_at(4))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
}
