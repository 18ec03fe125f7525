use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use surge::artifacts::remote::LocalTransport;
use surge::commands::porcelain::reset::ResetMode;
use surge::errors::ErrorKind;

#[rstest]
#[tokio::test]
async fn pushing_to_an_unborn_remote_sends_the_whole_history(
    sandbox: Sandbox,
    #[from(sandbox)] remote: Sandbox,
) {
    sandbox.write("a.txt", "a\n");
    sandbox.commit_all("first", 0).await;
    sandbox.write("b/c.txt", "c\n");
    let tip = sandbox.commit_all("second", 1).await;
    let transport = LocalTransport::open("origin", remote.path()).unwrap();

    let pushed = sandbox.repository.push(&transport, None).await.unwrap();

    assert_eq!(pushed, tip);
    assert_eq!(remote.repository.resolve_commit("main").unwrap(), tip);
    assert_eq!(sandbox.repository.resolve_ref("origin/main").unwrap(), Some(tip.clone()));
    assert_eq!(remote.repository.walk_history("main").unwrap().count(), 2);
    assert_eq!(
        remote.repository.head_files().unwrap(),
        sandbox.repository.head_files().unwrap()
    );
    // the remote's working copy is left alone
    assert!(!remote.exists("a.txt"));
}

#[rstest]
#[tokio::test]
async fn fetch_records_a_remote_tracking_ref(sandbox: Sandbox, #[from(sandbox)] remote: Sandbox) {
    remote.write("a.txt", "from remote\n");
    let tip = remote.commit_all("remote work", 0).await;
    let transport = LocalTransport::open("origin", remote.path()).unwrap();

    let fetched = sandbox.repository.fetch(&transport, "main").await.unwrap();

    assert_eq!(fetched, tip);
    assert_eq!(sandbox.repository.resolve_ref("origin/main").unwrap(), Some(tip.clone()));
    assert!(sandbox.repository.database().contains(&tip).unwrap());
    // the local branch does not move
    assert_eq!(sandbox.repository.resolve_ref("main").unwrap(), None);

    let again = sandbox.repository.fetch(&transport, "main").await.unwrap();
    assert_eq!(again, tip);
}

#[rstest]
#[tokio::test]
async fn fetching_a_missing_branch_is_not_found(sandbox: Sandbox, #[from(sandbox)] remote: Sandbox) {
    let transport = LocalTransport::open("origin", remote.path()).unwrap();

    let error = sandbox.repository.fetch(&transport, "nope").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn a_diverged_push_is_rejected(sandbox: Sandbox, #[from(sandbox)] remote: Sandbox) {
    sandbox.write("a.txt", "shared\n");
    sandbox.commit_all("shared", 0).await;
    let transport = LocalTransport::open("origin", remote.path()).unwrap();
    sandbox.repository.push(&transport, Some("main")).await.unwrap();

    remote.repository.reset("main", ResetMode::Hard).await.unwrap();
    remote.write("remote.txt", "remote\n");
    let remote_tip = remote.commit_all("remote only", 1).await;

    sandbox.write("local.txt", "local\n");
    sandbox.commit_all("local only", 2).await;
    let error = sandbox.repository.push(&transport, None).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Rejected);
    assert_eq!(remote.repository.resolve_commit("main").unwrap(), remote_tip);
}

#[rstest]
#[tokio::test]
async fn fetch_then_merge_allows_the_push(sandbox: Sandbox, #[from(sandbox)] remote: Sandbox) {
    sandbox.write("a.txt", "shared\n");
    sandbox.commit_all("shared", 0).await;
    let transport = LocalTransport::open("origin", remote.path()).unwrap();
    sandbox.repository.push(&transport, None).await.unwrap();

    remote.repository.reset("main", ResetMode::Hard).await.unwrap();
    remote.write("remote.txt", "remote\n");
    remote.commit_all("remote only", 1).await;

    sandbox.write("local.txt", "local\n");
    sandbox.commit_all("local only", 2).await;
    sandbox.repository.fetch(&transport, "main").await.unwrap();
    sandbox
        .repository
        .merge("origin/main", false, author_at(3))
        .await
        .unwrap();

    let tip = sandbox.repository.push(&transport, None).await.unwrap();
    assert_eq!(remote.repository.resolve_commit("main").unwrap(), tip);
}

#[rstest]
#[tokio::test]
async fn an_unreadable_local_store_fails_the_fetch(sandbox: Sandbox, #[from(sandbox)] remote: Sandbox) {
    remote.write("a.txt", "from remote\n");
    let tip = remote.commit_all("remote work", 0).await;
    let transport = LocalTransport::open("origin", remote.path()).unwrap();
    // a plain file where the tip's fan-out directory belongs
    sandbox.write(&format!(".surge/objects/{}", &tip.as_ref()[..2]), "");

    let error = sandbox.repository.fetch(&transport, "main").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Io);
    assert_eq!(sandbox.repository.resolve_ref("origin/main").unwrap(), None);
}
