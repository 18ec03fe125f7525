use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{Status, StatusReport};
use crate::errors::Result;

impl Repository {
    /// Staged, unstaged, untracked and conflicted paths
    ///
    /// Read-only: works on a fresh copy of the index and takes no lock.
    pub fn status(&self) -> Result<StatusReport> {
        let index = self.load_index()?;
        let head_files = self.head_files()?;

        Status::new(self.workspace(), self.ignore()).report(&head_files, &index)
    }
}
