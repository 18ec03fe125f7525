use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Allow the first commit of an empty repository to record no files
    pub allow_empty_root: bool,
}

impl Repository {
    /// Record the staged changes on top of HEAD and advance the current ref
    pub async fn commit(&self, message: &str, author: Author) -> Result<ObjectId> {
        self.commit_with_options(message, author, CommitOptions::default())
            .await
    }

    pub async fn commit_with_options(
        &self,
        message: &str,
        author: Author,
        options: CommitOptions,
    ) -> Result<ObjectId> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::rejected("aborting commit due to empty commit message"));
        }

        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.has_conflicts() {
            return Err(Error::ManualResolutionRequired {
                paths: index.conflicted_paths(),
            });
        }

        let head = self.refs().read_head()?;
        let merge_head = self.refs().read_merge_head()?;
        let head_tree = head
            .as_ref()
            .map(|oid| self.database().parse_object_as_commit(oid))
            .transpose()?
            .map(|commit| commit.tree_oid().clone());

        let tree = index.overlay(self.database().flatten_tree(head_tree.as_ref())?);
        let tree_oid = self.database().write_tree(&tree)?;

        // a merge conclusion records history even when the tree is unchanged
        if merge_head.is_none() {
            let unchanged = match &head_tree {
                None => index.is_empty() && !options.allow_empty_root,
                Some(head_tree) => index.is_empty() || head_tree == &tree_oid,
            };
            if unchanged {
                return Err(Error::EmptyCommit);
            }
        }

        let parents = head.into_iter().chain(merge_head).collect::<Vec<_>>();
        let commit = Commit::new(parents, tree_oid, author, message.to_string());
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_head(&commit_oid)?;
        self.refs().clear_merge_head()?;
        index.clear();
        index.write_updates()?;

        info!(oid = %commit_oid, parents = commit.parents().len(), "committed");
        Ok(commit_oid)
    }
}
