use crate::common::{Sandbox, author_at, sandbox};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeSet;
use surge::artifacts::branch::branch_name::BranchName;
use surge::artifacts::merge::common_ancestor::ParentTraversal;
use surge::artifacts::objects::commit::Commit;
use surge::artifacts::objects::object_id::ObjectId;
use surge::commands::porcelain::merge::MergeOutcome;
use surge::errors::ErrorKind;

struct Merged {
    root: ObjectId,
    ours: ObjectId,
    theirs: ObjectId,
    merge: ObjectId,
}

async fn merged_history(sandbox: &Sandbox) -> Merged {
    sandbox.write("shared.txt", "base\n");
    let root = sandbox.commit_all("root", 0).await;
    sandbox.repository.create_branch("feature", None).await.unwrap();

    sandbox.write("ours.txt", "ours\n");
    let ours = sandbox.commit_all("ours", 1).await;

    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("theirs.txt", "theirs\n");
    let theirs = sandbox.commit_all("theirs", 2).await;

    sandbox.repository.checkout("main").await.unwrap();
    let MergeOutcome::Merged(merge) = sandbox.repository.merge("feature", false, author_at(3)).await.unwrap() else {
        panic!("expected a merge commit");
    };

    Merged {
        root,
        ours,
        theirs,
        merge,
    }
}

fn oids<I>(walk: I) -> Vec<ObjectId>
where
    I: Iterator<Item = surge::errors::Result<(ObjectId, Commit)>>,
{
    walk.map(|entry| entry.unwrap().0).collect()
}

#[rstest]
#[tokio::test]
async fn history_follows_first_parents(sandbox: Sandbox) {
    let merged = merged_history(&sandbox).await;

    let history = oids(sandbox.repository.walk_history("HEAD").unwrap());

    assert_eq!(history, vec![merged.merge, merged.ours, merged.root]);
}

#[rstest]
#[tokio::test]
async fn full_walk_visits_both_sides_newest_first(sandbox: Sandbox) {
    let merged = merged_history(&sandbox).await;

    let all = oids(sandbox.repository.walk_all("HEAD").unwrap());

    assert_eq!(all, vec![merged.merge, merged.theirs, merged.ours, merged.root]);
}

#[rstest]
#[tokio::test]
async fn an_unborn_branch_has_no_history(sandbox: Sandbox) {
    assert_eq!(sandbox.repository.walk_history("HEAD").unwrap().count(), 0);
    assert_eq!(sandbox.repository.walk_all("main").unwrap().count(), 0);
}

#[rstest]
#[tokio::test]
async fn merge_base_after_a_merge(sandbox: Sandbox) {
    let merged = merged_history(&sandbox).await;

    sandbox.repository.checkout("feature").await.unwrap();
    sandbox.write("theirs.txt", "theirs again\n");
    let later = sandbox.commit_all("later", 4).await;

    let repository = &sandbox.repository;
    assert_eq!(
        repository.find_common_ancestor(&merged.merge, &later).unwrap(),
        merged.theirs
    );
    assert_eq!(
        repository
            .find_common_ancestor_with(&merged.merge, &later, ParentTraversal::FirstParent)
            .unwrap(),
        merged.root
    );
    assert_eq!(
        repository.find_common_ancestor(&merged.ours, &merged.ours).unwrap(),
        merged.ours
    );
}

#[rstest]
#[tokio::test]
async fn unrelated_roots_have_no_common_ancestor(sandbox: Sandbox) {
    sandbox.write("a.txt", "a\n");
    let root = sandbox.commit_all("root", 0).await;

    let database = sandbox.repository.database();
    let tree = database.parse_object_as_commit(&root).unwrap().tree_oid().clone();
    let orphan = database
        .store(&Commit::new(vec![], tree, author_at(5), "orphan".to_string()))
        .unwrap();

    let error = sandbox.repository.find_common_ancestor(&root, &orphan).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NoCommonAncestor);

    let branch = BranchName::try_parse("orphan").unwrap();
    sandbox.repository.refs().write_branch(&branch, Some(&orphan)).unwrap();
    let error = sandbox.repository.merge("orphan", true, author_at(6)).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NoCommonAncestor);
    assert_eq!(sandbox.head(), root);
}

#[rstest]
#[tokio::test]
async fn every_commit_is_reachable_exactly_once(sandbox: Sandbox) {
    merged_history(&sandbox).await;

    let all = oids(sandbox.repository.walk_all("HEAD").unwrap());
    let unique = all.iter().cloned().collect::<BTreeSet<_>>();

    assert_eq!(all.len(), unique.len());
}

#[rstest]
#[tokio::test]
async fn merging_a_side_branch_does_not_pull_the_base_back(sandbox: Sandbox) {
    let repository = &sandbox.repository;
    sandbox.write("g.txt", "one\n");
    sandbox.commit_all("root", 0).await;
    sandbox.write("o.txt", "o\n");
    sandbox.commit_all("fork point of side", 1).await;
    repository.create_branch("side", None).await.unwrap();

    sandbox.write("g.txt", "two\n");
    let fork = sandbox.commit_all("fork point of feature", 2).await;
    repository.create_branch("feature", None).await.unwrap();
    for (step, content) in ["c1", "c2"].into_iter().enumerate() {
        sandbox.write("main.txt", content);
        sandbox.commit_all(content, 3 + step as i64).await;
    }
    sandbox.write("g.txt", "three\n");
    sandbox.commit_all("c3", 5).await;

    repository.checkout("side").await.unwrap();
    sandbox.write("q.txt", "q\n");
    sandbox.commit_all("side work", 6).await;
    repository.checkout("main").await.unwrap();
    let MergeOutcome::Merged(_) = repository.merge("side", false, author_at(7)).await.unwrap() else {
        panic!("expected a merge commit");
    };

    repository.checkout("feature").await.unwrap();
    sandbox.write("f.txt", "f\n");
    let feature = sandbox.commit_all("feature work", 8).await;
    repository.checkout("main").await.unwrap();

    assert_eq!(repository.find_common_ancestor(&sandbox.head(), &feature).unwrap(), fork);

    let outcome = repository.merge("feature", false, author_at(9)).await.unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged(_)));
    assert_eq!(sandbox.read("g.txt"), "three\n");
    assert!(sandbox.exists("f.txt"));
    assert!(sandbox.exists("q.txt"));
}
