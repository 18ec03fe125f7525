use crate::areas::repository::Repository;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

impl Repository {
    /// Stop tracking paths, deleting them from the working copy unless `cached`
    ///
    /// A directory removes every tracked file below it. Returns the removed paths.
    pub async fn remove_files<P: AsRef<Path>>(&self, paths: &[P], cached: bool) -> Result<Vec<PathBuf>> {
        let _guard = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_files = self.head_files()?;
        let tracked = index
            .overlay(head_files.clone())
            .files()
            .map(|(path, _)| path.clone())
            .collect::<Vec<_>>();

        let mut targets = Vec::new();
        for path in paths {
            let relative = self.workspace().relativize(path.as_ref())?;
            let matched = tracked
                .iter()
                .filter(|candidate| candidate.starts_with(&relative))
                .cloned()
                .collect::<Vec<_>>();
            if matched.is_empty() {
                return Err(Error::PathNotFound(relative));
            }
            targets.extend(matched);
        }
        targets.sort();
        targets.dedup();

        for path in &targets {
            match head_files.get(path) {
                Some((oid, mode)) => index.stage_removal(path, oid.clone(), *mode)?,
                None => {
                    index.remove(path);
                }
            }

            if !cached {
                self.workspace().remove_file(path)?;
            }
            debug!(path = %path.display(), cached, "removed from tracking");
        }

        index.write_updates()?;

        Ok(targets)
    }
}
