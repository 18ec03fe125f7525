use crate::areas::database::FileMap;
use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::index::index_entry::{EntryTimestamp, IndexEntry};
use crate::artifacts::merge::common_ancestor::{CommonAncestorFinder, ParentTraversal};
use crate::artifacts::merge::conflict::ConflictLabels;
use crate::artifacts::merge::resolution::{ConflictedFile, MergePlan, SnapshotMerge};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeBuilder;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Everything on the other branch is already part of HEAD
    AlreadyUpToDate,
    /// A two-parent merge commit was created
    Merged(ObjectId),
}

impl Repository {
    /// Merge base of two commits, following every parent of merge commits
    pub fn find_common_ancestor(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<ObjectId> {
        self.find_common_ancestor_with(ours, theirs, ParentTraversal::AllParents)
    }

    pub fn find_common_ancestor_with(
        &self,
        ours: &ObjectId,
        theirs: &ObjectId,
        traversal: ParentTraversal,
    ) -> Result<ObjectId> {
        let database = self.database();
        CommonAncestorFinder::new(|oid: &ObjectId| database.slim_commit(oid), traversal).find(ours, theirs)
    }

    /// Merge `branch` into HEAD
    ///
    /// A clean result is committed with HEAD and `branch` as parents. On
    /// conflict the clean paths are staged, marker text is left in the
    /// conflicting files, MERGE_HEAD is written, and the call fails with
    /// [`Error::ManualResolutionRequired`]; committing after re-staging those
    /// paths concludes the merge.
    pub async fn merge(&self, branch: &str, auto_resolve: bool, author: Author) -> Result<MergeOutcome> {
        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if self.refs().read_merge_head()?.is_some() {
            return Err(Error::rejected("a merge is already in progress; commit or reset it first"));
        }
        if !index.is_empty() {
            return Err(Error::rejected("cannot merge with staged changes; commit or reset them first"));
        }

        let ours = self
            .refs()
            .read_head()?
            .ok_or_else(|| Error::rejected("cannot merge into a branch without commits"))?;
        let theirs = self.resolve_commit(branch)?;

        let base = self.find_common_ancestor(&ours, &theirs)?;
        if base == theirs {
            info!(branch, "already up to date");
            return Ok(MergeOutcome::AlreadyUpToDate);
        }
        debug!(%ours, %theirs, %base, "merge base found");

        let base_files = self.database().commit_files(Some(&base))?;
        let our_files = self.database().commit_files(Some(&ours))?;
        let their_files = self.database().commit_files(Some(&theirs))?;

        let our_label = self
            .refs()
            .current_branch()?
            .map(|name| name.to_string())
            .unwrap_or_else(|| "HEAD".to_string());
        let labels = ConflictLabels::new(our_label, branch.to_string());
        let plan = SnapshotMerge::new(self.database(), labels, auto_resolve).plan(&base_files, &our_files, &their_files)?;
        let merged_files = plan.apply_to(&our_files);

        let touched = plan.updates.keys().chain(plan.conflicts.keys()).map(PathBuf::as_path);
        let blocked = Inspector::new(self.workspace()).changed_paths(&our_files, touched)?;
        if !blocked.is_empty() {
            return Err(Error::rejected(format!(
                "local changes would be overwritten by merge: {}",
                blocked
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        self.workspace()
            .apply_migration(&Migration::plan(&our_files, &merged_files), self.database())?;

        if !plan.is_clean() {
            warn!(branch, conflicts = plan.conflicts.len(), "merge stopped on conflicts");
            self.refs().write_merge_head(&theirs)?;
            self.stage_clean_updates(&mut index, &plan, &our_files)?;
            let paths = self.resolve_conflicts(&mut index, &plan.conflicts)?;
            return Err(Error::ManualResolutionRequired { paths });
        }

        let tree = merged_files
            .into_iter()
            .map(|(path, (oid, mode))| (path, oid, mode))
            .collect::<TreeBuilder>();
        let tree_oid = self.database().write_tree(&tree)?;

        let message = format!("Merge branch '{branch}'");
        let commit = Commit::new(vec![ours, theirs], tree_oid, author, message);
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        info!(branch, oid = %commit_oid, "merged");
        Ok(MergeOutcome::Merged(commit_oid))
    }

    fn stage_clean_updates(&self, index: &mut Index, plan: &MergePlan, our_files: &FileMap) -> Result<()> {
        for (path, update) in &plan.updates {
            match (update, our_files.get(path)) {
                (Some((oid, mode)), _) => {
                    index.upsert(IndexEntry::staged(path.clone(), oid.clone(), *mode, EntryTimestamp::now()))?;
                }
                (None, Some((oid, mode))) => index.stage_removal(path, oid.clone(), *mode)?,
                (None, None) => {}
            }
        }

        Ok(())
    }

    /// Leave marker text in each conflicting file and mark it conflicted,
    /// returning the paths that now need a human
    pub(crate) fn resolve_conflicts(
        &self,
        index: &mut Index,
        conflicts: &BTreeMap<PathBuf, ConflictedFile>,
    ) -> Result<Vec<PathBuf>> {
        for (path, conflict) in conflicts {
            self.workspace().write_file(path, conflict.text.as_bytes(), conflict.mode)?;
            let oid = self.database().put(conflict.text.as_bytes())?;
            index.mark_conflicted(path, oid, conflict.mode)?;
        }
        index.write_updates()?;

        Ok(conflicts.keys().cloned().collect())
    }
}
