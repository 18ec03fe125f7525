use crate::common::{Sandbox, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;
use surge::areas::index::AddOutcome;

#[rstest]
#[tokio::test]
async fn two_files_with_the_same_bytes_reference_one_blob(sandbox: Sandbox) {
    sandbox.write("one.txt", "same data");
    sandbox.write("two.txt", "same data");

    let outcomes = sandbox.repository.add_files(&["one.txt", "two.txt"]).await.unwrap();

    let index = sandbox.repository.load_index().unwrap();
    let one = index.entry_by_path(Path::new("one.txt")).unwrap();
    let two = index.entry_by_path(Path::new("two.txt")).unwrap();
    assert_eq!(one.oid, two.oid);
    assert_eq!(outcomes[0].1, AddOutcome::Staged(one.oid.clone()));
    assert_eq!(sandbox.object_count(), 1);
}

#[rstest]
#[tokio::test]
async fn storing_the_same_content_twice_keeps_one_copy(sandbox: Sandbox) {
    let database = sandbox.repository.database();

    let first = database.put(b"same data").unwrap();
    let second = database.put(b"same data").unwrap();

    assert_eq!(first, second);
    assert_eq!(sandbox.object_count(), 1);
}
