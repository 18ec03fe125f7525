use crate::areas::database::FileMap;
use crate::areas::refs::HeadTarget;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::{Error, Result};
use tracing::{info, warn};

impl Repository {
    /// Switch HEAD to a branch, or detach it at any other revision
    ///
    /// Refused while changes are staged, while a merge is unfinished, or when
    /// a local change would be overwritten.
    pub async fn checkout(&self, target: &str) -> Result<HeadTarget> {
        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if !index.is_empty() {
            return Err(Error::rejected("cannot checkout with staged changes; commit or reset them first"));
        }
        if self.refs().read_merge_head()?.is_some() {
            return Err(Error::rejected("cannot checkout during an unfinished merge"));
        }

        let branch = BranchName::try_parse(target)
            .ok()
            .filter(|branch| self.refs().branch_exists(branch));
        let target_oid = match &branch {
            Some(branch) => self.refs().read_branch(branch)?,
            None => Some(self.resolve_commit(target)?),
        };

        let from = self.head_files()?;
        let to = self.database().commit_files(target_oid.as_ref())?;
        self.migrate_workspace(&from, &to)?;

        let head = match (branch, target_oid) {
            (Some(branch), _) => {
                self.refs().set_head_branch(&branch)?;
                HeadTarget::Branch(branch)
            }
            (None, Some(oid)) => {
                self.refs().set_head_detached(&oid)?;
                HeadTarget::Detached(oid)
            }
            (None, None) => return Err(Error::RevisionNotFound(target.to_string())),
        };

        info!(target, "checked out");
        Ok(head)
    }

    /// Rewrite the working copy from one snapshot to another, refusing to
    /// overwrite files that differ from `from`
    pub(crate) fn migrate_workspace(&self, from: &FileMap, to: &FileMap) -> Result<Migration> {
        let migration = Migration::plan(from, to);

        let blocked = Inspector::new(self.workspace()).changed_paths(from, migration.paths())?;
        if !blocked.is_empty() {
            warn!(paths = blocked.len(), "local changes block the working-copy update");
            return Err(Error::rejected(format!(
                "local changes would be overwritten: {}",
                blocked
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        self.workspace().apply_migration(&migration, self.database())?;
        Ok(migration)
    }
}
