use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn first_commit_moves_the_default_branch(sandbox: Sandbox) {
    sandbox.write("a.txt", "hello");
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();

    let oid = sandbox.repository.commit("first", author_at(0)).await.unwrap();

    assert_eq!(sandbox.repository.resolve_ref("main").unwrap(), Some(oid.clone()));
    assert_eq!(sandbox.repository.resolve_ref("HEAD").unwrap(), Some(oid.clone()));
    assert!(sandbox.repository.load_index().unwrap().is_empty());

    let history = sandbox
        .repository
        .walk_history("main")
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0, oid);
    assert!(history[0].1.parents().is_empty());
    assert_eq!(history[0].1.message(), "first");
}

#[rstest]
#[tokio::test]
async fn unborn_branch_resolves_to_nothing(sandbox: Sandbox) {
    assert_eq!(sandbox.repository.resolve_ref("main").unwrap(), None);
    assert_eq!(sandbox.repository.walk_history("HEAD").unwrap().count(), 0);
}

#[rstest]
#[tokio::test]
async fn committed_tree_records_every_file(sandbox: Sandbox) {
    sandbox.write("a.txt", "hello");
    sandbox.write("src/lib.rs", "pub fn answer() -> u32 { 42 }\n");
    sandbox.write("src/nested/deep.txt", "deep\n");

    let oid = sandbox.commit_all("first", 0).await;

    let files = sandbox.repository.database().commit_files(Some(&oid)).unwrap();
    assert_eq!(
        files.keys().map(|path| path.display().to_string()).collect::<Vec<_>>(),
        vec!["a.txt", "src/lib.rs", "src/nested/deep.txt"]
    );
}
