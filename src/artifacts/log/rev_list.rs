use crate::areas::database::Database;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::collections::{BinaryHeap, HashSet};

/// Lazy walk down the first-parent chain
///
/// Ends after a root commit. A commit that cannot be loaded is yielded as an
/// error and stops the walk.
#[derive(Debug, Clone)]
pub struct RevList<'r> {
    database: &'r Database,
    current_commit_oid: Option<ObjectId>,
}

impl<'r> RevList<'r> {
    /// `None` walks nothing, for an unborn branch
    pub fn new(database: &'r Database, start: Option<ObjectId>) -> Self {
        RevList {
            database,
            current_commit_oid: start,
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.database.parse_object_as_commit(&commit_oid) {
            Ok(commit) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

/// Every ancestor of a commit, each once, newest committer timestamp first
///
/// A parent that cannot be loaded is yielded as an error and stops the walk.
#[derive(Debug)]
pub struct DagWalk<'r> {
    database: &'r Database,
    queue: BinaryHeap<SlimCommit>,
    seen: HashSet<ObjectId>,
    error: Option<Error>,
    failed: bool,
}

impl<'r> DagWalk<'r> {
    pub fn new(database: &'r Database, start: Option<ObjectId>) -> Self {
        let mut walk = DagWalk {
            database,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            error: None,
            failed: false,
        };
        if let Some(start) = start {
            walk.enqueue(start);
        }

        walk
    }

    fn enqueue(&mut self, oid: ObjectId) {
        if !self.seen.insert(oid.clone()) {
            return;
        }

        match self.database.slim_commit(&oid) {
            Ok(slim) => self.queue.push(slim),
            Err(error) => {
                self.error.get_or_insert(error);
            }
        }
    }
}

impl Iterator for DagWalk<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(error) = self.error.take() {
            self.failed = true;
            return Some(Err(error));
        }

        let slim = self.queue.pop()?;
        match self.database.parse_object_as_commit(&slim.oid) {
            Ok(commit) => {
                for parent in commit.parents() {
                    self.enqueue(parent.clone());
                }
                Some(Ok((slim.oid, commit)))
            }
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}
