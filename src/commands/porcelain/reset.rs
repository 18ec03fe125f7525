use crate::areas::database::FileMap;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the current ref only
    Soft,
    /// Also empty the index and abandon an unfinished merge
    #[default]
    Mixed,
    /// Also make the working copy match the target, discarding local changes
    Hard,
}

impl Repository {
    /// Point the current branch (or detached HEAD) at `target`
    pub async fn reset(&self, target: &str, mode: ResetMode) -> Result<ObjectId> {
        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let target_oid = self.resolve_commit(target)?;
        let target_files = self.database().commit_files(Some(&target_oid))?;

        if mode == ResetMode::Hard {
            // what the working copy should hold right now, staged changes included
            let expected = index
                .overlay(self.head_files()?)
                .files()
                .map(|(path, entry)| (path.clone(), entry.clone()))
                .collect::<FileMap>();
            let migration = Migration::plan(&expected, &target_files);
            self.workspace().apply_migration(&migration, self.database())?;
            self.restore_modified(&target_files)?;
        }

        self.refs().update_head(&target_oid)?;

        if mode != ResetMode::Soft {
            self.refs().clear_merge_head()?;
            index.clear();
            index.write_updates()?;
        }

        info!(target, oid = %target_oid, ?mode, "reset");
        Ok(target_oid)
    }

    // files whose content drifted from the target without being staged
    fn restore_modified(&self, target_files: &FileMap) -> Result<()> {
        let drifted = Inspector::new(self.workspace())
            .changed_paths(target_files, target_files.keys().map(PathBuf::as_path))?;

        for path in drifted {
            if let Some((oid, mode)) = target_files.get(&path) {
                let data = self.database().parse_object_as_blob(oid)?.into_data();
                self.workspace().write_file(&path, &data, *mode)?;
            }
        }

        Ok(())
    }
}
