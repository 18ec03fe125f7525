use crate::common::{Sandbox, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use surge::artifacts::diff::tree_diff::TreeChangeType;

#[rstest]
#[tokio::test]
async fn lists_added_modified_and_deleted_paths(sandbox: Sandbox) {
    sandbox.write("changed.txt", "old\nshared\n");
    sandbox.write("removed.txt", "bye\n");
    sandbox.commit_all("first", 0).await;

    sandbox.write("changed.txt", "new\nshared\n");
    std::fs::remove_file(sandbox.path().join("removed.txt")).unwrap();
    sandbox.write("dir/added.txt", "hi\n");
    sandbox.commit_all("second", 1).await;

    let patches = sandbox.repository.diff("HEAD^", "HEAD").unwrap();

    let summary = patches
        .iter()
        .map(|patch| (patch.path.clone(), patch.change.status_char()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (PathBuf::from("changed.txt"), 'M'),
            (PathBuf::from("dir/added.txt"), 'A'),
            (PathBuf::from("removed.txt"), 'D'),
        ]
    );

    let rendered = patches[0].render();
    assert!(rendered.contains("-old"));
    assert!(rendered.contains("+new"));
    assert!(rendered.contains(" shared"));
}

#[rstest]
#[tokio::test]
async fn identical_revisions_have_no_changes(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");
    sandbox.commit_all("first", 0).await;

    assert!(sandbox.repository.diff("HEAD", "main").unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn binary_content_has_no_hunks(sandbox: Sandbox) {
    std::fs::write(sandbox.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    sandbox.commit_all("first", 0).await;
    std::fs::write(sandbox.path().join("blob.bin"), [0u8, 1, 2, 3]).unwrap();
    sandbox.commit_all("second", 1).await;

    let patches = sandbox.repository.diff("HEAD^", "HEAD").unwrap();

    assert_eq!(patches.len(), 1);
    assert!(matches!(patches[0].change, TreeChangeType::Modified { .. }));
    assert_eq!(patches[0].hunks, None);
}
