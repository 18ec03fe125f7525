use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::{DagWalk, RevList};
use crate::errors::Result;

impl Repository {
    /// First-parent history from a revision, newest first
    pub fn walk_history(&self, start: &str) -> Result<RevList<'_>> {
        Ok(RevList::new(self.database(), self.resolve_ref(start)?))
    }

    /// Every commit reachable from a revision through any parent, newest first
    pub fn walk_all(&self, start: &str) -> Result<DagWalk<'_>> {
        Ok(DagWalk::new(self.database(), self.resolve_ref(start)?))
    }
}
