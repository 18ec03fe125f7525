use crate::common::{Sandbox, random_content, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use surge::errors::ErrorKind;

#[rstest]
#[tokio::test]
async fn new_branches_start_at_head_and_list_in_name_order(sandbox: Sandbox) {
    sandbox.write("a.txt", &random_content());
    let tip = sandbox.commit_all("first", 0).await;

    sandbox.repository.create_branch("zeta", None).await.unwrap();
    sandbox.repository.create_branch("feature/login", None).await.unwrap();

    let branches = sandbox.repository.list_branches().unwrap();
    assert_eq!(
        branches.iter().map(|branch| branch.name.to_string()).collect::<Vec<_>>(),
        vec!["feature/login", "main", "zeta"]
    );
    assert!(branches.iter().all(|branch| branch.oid.as_ref() == Some(&tip)));
}

#[rstest]
#[tokio::test]
async fn a_start_revision_picks_the_tip(sandbox: Sandbox) {
    sandbox.write("a.txt", "one\n");
    let first = sandbox.commit_all("first", 0).await;
    sandbox.write("a.txt", "two\n");
    sandbox.commit_all("second", 1).await;

    let oid = sandbox.repository.create_branch("older", Some("HEAD^")).await.unwrap();

    assert_eq!(oid, first);
    assert_eq!(sandbox.repository.resolve_commit("older").unwrap(), first);
}

#[rstest]
#[case::existing("main", ErrorKind::Rejected)]
#[case::double_dot("bad..name", ErrorKind::Rejected)]
#[case::trailing_lock("topic.lock", ErrorKind::Rejected)]
#[tokio::test]
async fn invalid_or_taken_names_are_refused(sandbox: Sandbox, #[case] name: &str, #[case] kind: ErrorKind) {
    sandbox.write("a.txt", &random_content());
    sandbox.commit_all("first", 0).await;

    let error = sandbox.repository.create_branch(name, None).await.unwrap_err();

    assert_eq!(error.kind(), kind);
}

#[rstest]
#[tokio::test]
async fn branching_needs_a_commit(sandbox: Sandbox) {
    let error = sandbox.repository.create_branch("early", None).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
}

#[rstest]
#[tokio::test]
async fn the_checked_out_branch_cannot_be_deleted(sandbox: Sandbox) {
    sandbox.write("a.txt", &random_content());
    let tip = sandbox.commit_all("first", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();

    let refused = sandbox.repository.delete_branch("main").await.unwrap_err();
    let deleted = sandbox.repository.delete_branch("feature").await.unwrap();

    assert_eq!(refused.kind(), ErrorKind::Rejected);
    assert_eq!(deleted, Some(tip));
    assert_eq!(
        sandbox
            .repository
            .list_branches()
            .unwrap()
            .into_iter()
            .map(|branch| branch.name.to_string())
            .collect::<Vec<_>>(),
        vec!["main"]
    );
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_branch_is_not_found(sandbox: Sandbox) {
    let error = sandbox.repository.delete_branch("ghost").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}
