use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use surge::errors::ErrorKind;

#[rstest]
#[tokio::test]
async fn the_lock_can_be_taken_again_after_release(sandbox: Sandbox) {
    let lock = sandbox.repository.repo_lock();

    let mut first = lock.acquire().await.unwrap();
    assert!(first.is_held());
    first.release().unwrap();
    assert!(!first.is_held());

    let second = lock.acquire().await.unwrap();
    drop(second);

    assert!(lock.try_acquire().unwrap().is_some());
}

#[rstest]
#[tokio::test]
async fn a_held_lock_times_out_other_callers(sandbox: Sandbox) {
    let _held = sandbox.repository.repo_lock().try_acquire().unwrap().unwrap();

    assert!(sandbox.repository.repo_lock().try_acquire().unwrap().is_none());
    let error = sandbox.repository.repo_lock().acquire().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::LockTimeout);
}

#[rstest]
#[tokio::test]
async fn a_timed_out_commit_changes_nothing(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");
    let first = sandbox.commit_all("first", 0).await;
    sandbox.write("a.txt", "b\n");
    sandbox.repository.add_files(&["a.txt"]).await.unwrap();
    let index_before = std::fs::read(sandbox.repository.surge_path().join("index")).unwrap();

    let held = sandbox.repository.repo_lock().try_acquire().unwrap().unwrap();
    let error = sandbox.repository.commit("blocked", author_at(1)).await.unwrap_err();
    drop(held);

    assert_eq!(error.kind(), ErrorKind::LockTimeout);
    assert_eq!(sandbox.head(), first);
    assert_eq!(
        std::fs::read(sandbox.repository.surge_path().join("index")).unwrap(),
        index_before
    );

    sandbox.repository.commit("unblocked", author_at(2)).await.unwrap();
    assert_ne!(sandbox.head(), first);
}

#[rstest]
#[tokio::test]
async fn staging_waits_for_the_lock_too(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");

    let _held = sandbox.repository.repo_lock().try_acquire().unwrap().unwrap();
    let error = sandbox.repository.add_files(&["a.txt"]).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::LockTimeout);
    assert!(sandbox.repository.load_index().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn concurrent_staging_is_serialised(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");
    sandbox.write("b.txt", "b\n");

    let (a, b) = futures::future::join(
        sandbox.repository.add_files(&["a.txt"]),
        sandbox.repository.add_files(&["b.txt"]),
    )
    .await;
    a.unwrap();
    b.unwrap();

    let staged = sandbox
        .repository
        .load_index()
        .unwrap()
        .entries()
        .map(|entry| entry.path.display().to_string())
        .collect::<Vec<_>>();
    assert_eq!(staged, vec!["a.txt", "b.txt"]);
}
