use crate::areas::repository::Repository;
use crate::artifacts::diff::patch::FilePatch;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::errors::Result;
use std::path::Path;

impl Repository {
    /// Per-path changes turning the snapshot at `from` into the one at `to`
    ///
    /// Either side may name an unborn branch, which reads as the empty snapshot.
    pub fn diff(&self, from: &str, to: &str) -> Result<Vec<FilePatch>> {
        let from = self.resolve_ref(from)?;
        let to = self.resolve_ref(to)?;

        let mut tree_diff = TreeDiff::new(self.database());
        tree_diff.compare_oids(from.as_ref(), to.as_ref(), Path::new(""))?;

        tree_diff
            .into_changes()
            .into_iter()
            .map(|(path, change)| FilePatch::build(path, change, self.database()))
            .collect()
    }
}
