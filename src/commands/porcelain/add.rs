use crate::areas::database::FileMap;
use crate::areas::index::{AddOutcome, Index};
use crate::areas::repository::Repository;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

impl Repository {
    /// Stage files or whole directories
    ///
    /// Paths may be absolute or relative to the repository root. A tracked
    /// file that no longer exists is staged for removal. Every path is
    /// checked before anything is staged, so an unknown path leaves the index
    /// untouched.
    pub async fn add_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<(PathBuf, AddOutcome)>> {
        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_files = self.head_files()?;
        let mut targets = Vec::new();
        for path in paths {
            targets.extend(self.expand_add_target(path.as_ref(), &index, &head_files)?);
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = self.stage_path(&mut index, &head_files, &target)?;
            outcomes.push((target, outcome));
        }

        index.write_updates()?;

        Ok(outcomes)
    }

    fn expand_add_target(&self, path: &Path, index: &Index, head_files: &FileMap) -> Result<Vec<PathBuf>> {
        let relative = self.workspace().relativize(path)?;
        let absolute = self.path().join(&relative);

        if absolute.is_dir() {
            let mut files = self.workspace().list_files_under(&relative, self.ignore())?;
            // tracked files that vanished from the directory
            files.extend(
                head_files
                    .keys()
                    .chain(index.entries().map(|entry| &entry.path))
                    .filter(|tracked| tracked.starts_with(&relative) && !self.workspace().exists(tracked))
                    .cloned(),
            );
            files.sort();
            files.dedup();

            return Ok(files);
        }

        let tracked = head_files.contains_key(&relative) || index.entry_by_path(&relative).is_some();
        if absolute.is_file() || tracked {
            Ok(vec![relative])
        } else {
            Err(Error::PathNotFound(relative))
        }
    }

    fn stage_path(&self, index: &mut Index, head_files: &FileMap, path: &Path) -> Result<AddOutcome> {
        let head_entry = head_files.get(path);

        if !self.workspace().exists(path) {
            return match head_entry {
                Some((oid, mode)) => {
                    debug!(path = %path.display(), "staging removal");
                    index.stage_removal(path, oid.clone(), *mode)?;
                    Ok(AddOutcome::Removed)
                }
                None if index.remove(path) => Ok(AddOutcome::Unstaged),
                None => Err(Error::PathNotFound(path.to_path_buf())),
            };
        }

        let data = self.workspace().read_file(path)?;
        let mode = self.workspace().file_mode(path);
        let outcome = index.add(self.database(), self.ignore(), path, &data, mode)?;

        // content identical to HEAD is nothing to commit
        if let AddOutcome::Staged(oid) = &outcome
            && head_entry == Some(&(oid.clone(), mode))
        {
            index.remove(path);
            return Ok(AddOutcome::Unstaged);
        }

        Ok(outcome)
    }
}
