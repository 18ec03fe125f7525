//! Merge-base discovery
//!
//! Both commits paint their ancestry with a flag naming the side that reached
//! it, newest commit first. A commit carrying both flags is a common ancestor;
//! its own ancestors are painted stale so they are never reported. The walk
//! stops once only stale commits are left to visit.
//!
//! Candidates that are ancestors of another candidate are dropped. Of what
//! remains (several only in criss-cross histories) the newest wins, then the
//! smallest id.
//!
//! With [`ParentTraversal::AllParents`] every parent of a merge commit is
//! followed, so history that was merged before is recognised. The
//! [`ParentTraversal::FirstParent`] mode only follows the mainline.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::debug;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Paint: u8 {
        const FROM_OURS = 0b0001;
        const FROM_THEIRS = 0b0010;
        const BOTH = Self::FROM_OURS.bits() | Self::FROM_THEIRS.bits();
        /// Reachable from a common ancestor already found
        const STALE = 0b0100;
        const RESULT = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentTraversal {
    FirstParent,
    #[default]
    AllParents,
}

impl ParentTraversal {
    fn parents<'c>(&self, commit: &'c SlimCommit) -> &'c [ObjectId] {
        match self {
            ParentTraversal::FirstParent => &commit.parents[..commit.parents.len().min(1)],
            ParentTraversal::AllParents => &commit.parents,
        }
    }
}

/// Finds merge bases over any commit source
///
/// The loader is usually `|oid| database.slim_commit(oid)`, but tests feed it
/// an in-memory graph.
#[derive(Debug, Clone)]
pub struct CommonAncestorFinder<L>
where
    L: Fn(&ObjectId) -> Result<SlimCommit>,
{
    commit_loader: L,
    traversal: ParentTraversal,
}

impl<L> CommonAncestorFinder<L>
where
    L: Fn(&ObjectId) -> Result<SlimCommit>,
{
    pub fn new(commit_loader: L, traversal: ParentTraversal) -> Self {
        CommonAncestorFinder {
            commit_loader,
            traversal,
        }
    }

    pub fn find(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<ObjectId> {
        if ours == theirs {
            return Ok(ours.clone());
        }

        let candidates = self.common_ancestors(ours, theirs)?;
        let best = self.remove_redundant(candidates)?;
        debug!(%ours, %theirs, bases = best.len(), "best common ancestors");

        Self::pick(best).ok_or_else(|| Error::NoCommonAncestor {
            ours: ours.clone(),
            theirs: theirs.clone(),
        })
    }

    /// Common ancestors not reachable from an earlier-found one
    fn common_ancestors(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<Vec<SlimCommit>> {
        let mut paint = HashMap::<ObjectId, Paint>::new();
        let mut queue = BinaryHeap::new();
        for (oid, side) in [(ours, Paint::FROM_OURS), (theirs, Paint::FROM_THEIRS)] {
            paint.insert(oid.clone(), side);
            queue.push((self.commit_loader)(oid)?);
        }

        let flags_of = |paint: &HashMap<ObjectId, Paint>, oid: &ObjectId| {
            paint.get(oid).copied().unwrap_or(Paint::empty())
        };
        let mut candidates = Vec::new();

        while queue
            .iter()
            .any(|commit| !flags_of(&paint, &commit.oid).contains(Paint::STALE))
        {
            let Some(commit) = queue.pop() else {
                break;
            };

            let mut flags = flags_of(&paint, &commit.oid);
            if flags.contains(Paint::BOTH) && !flags.intersects(Paint::STALE | Paint::RESULT) {
                paint.insert(commit.oid.clone(), flags | Paint::RESULT | Paint::STALE);
                candidates.push(commit.clone());
                flags |= Paint::STALE;
            }
            let inherited = flags & (Paint::BOTH | Paint::STALE);

            for parent in self.traversal.parents(&commit) {
                let parent_flags = paint.entry(parent.clone()).or_insert(Paint::empty());
                if parent_flags.contains(inherited) {
                    continue;
                }

                *parent_flags |= inherited;
                queue.push((self.commit_loader)(parent)?);
            }
        }

        Ok(candidates)
    }

    // a candidate reachable from another candidate is never the best base
    fn remove_redundant(&self, candidates: Vec<SlimCommit>) -> Result<Vec<SlimCommit>> {
        let mut best = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            let mut redundant = false;
            for other in candidates.iter().filter(|other| other.oid != candidate.oid) {
                if self.is_ancestor(&candidate.oid, &other.oid)? {
                    redundant = true;
                    break;
                }
            }
            if !redundant {
                best.push(candidate.clone());
            }
        }

        Ok(best)
    }

    fn pick(candidates: Vec<SlimCommit>) -> Option<ObjectId> {
        candidates
            .into_iter()
            .min_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.oid.cmp(&b.oid)))
            .map(|commit| commit.oid)
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        let mut seen = HashSet::new();
        let mut pending = vec![descendant.clone()];

        while let Some(oid) = pending.pop() {
            if &oid == ancestor {
                return Ok(true);
            }
            if !seen.insert(oid.clone()) {
                continue;
            }

            let commit = (self.commit_loader)(&oid)?;
            pending.extend(self.traversal.parents(&commit).iter().cloned());
        }

        Ok(false)
    }
}
