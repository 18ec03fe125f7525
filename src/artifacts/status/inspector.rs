use crate::areas::database::FileMap;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::frame;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use crate::errors::Result;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Compares working-copy files with recorded ones by content and mode
#[derive(Debug, new)]
pub struct Inspector<'r> {
    workspace: &'r Workspace,
}

impl<'r> Inspector<'r> {
    /// Blob id the file would get, without storing anything
    pub fn hash_file(&self, path: &Path) -> Result<ObjectId> {
        let data = self.workspace.read_file(path)?;
        Ok(ObjectId::hash_record(&frame(ObjectType::Blob, &data)))
    }

    pub fn check_against(&self, path: &Path, expected: Option<&(ObjectId, FileMode)>) -> Result<Option<WorkspaceChangeType>> {
        let exists = self.workspace.exists(path);

        match (expected, exists) {
            (None, true) => Ok(Some(WorkspaceChangeType::Untracked)),
            (None, false) => Ok(None),
            (Some(_), false) => Ok(Some(WorkspaceChangeType::Deleted)),
            (Some((oid, mode)), true) => {
                let changed = self.workspace.file_mode(path) != *mode || &self.hash_file(path)? != oid;
                Ok(changed.then_some(WorkspaceChangeType::Modified))
            }
        }
    }

    /// Paths among `paths` whose working copy does not match `expected`,
    /// untracked files included
    pub fn changed_paths<'p>(
        &self,
        expected: &FileMap,
        paths: impl IntoIterator<Item = &'p Path>,
    ) -> Result<Vec<PathBuf>> {
        let mut changed = Vec::new();
        for path in paths {
            if self.check_against(path, expected.get(path))?.is_some() {
                changed.push(path.to_path_buf());
            }
        }

        Ok(changed)
    }
}
