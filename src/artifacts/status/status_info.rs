use crate::areas::database::FileMap;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::diff::tree_diff::{TreeChangeType, compare_file_maps};
use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::status::file_change::{FileChangeType, IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector::Inspector;
use crate::errors::Result;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub type FileSet = BTreeSet<PathBuf>;

/// Where every changed path stands
///
/// A path can show up both as staged and as modified when it was edited again
/// after being added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Next commit against HEAD
    pub staged: BTreeMap<PathBuf, IndexChangeType>,
    /// Working copy differs from what the next commit records
    pub modified: FileSet,
    /// Recorded for the next commit but missing from the working copy
    pub deleted: FileSet,
    /// Neither recorded nor ignored
    pub untracked: FileSet,
    /// Still carrying merge conflict markers
    pub conflicted: FileSet,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }

    /// Every entry in path order, as rendered by `status --short`
    pub fn changes(&self) -> BTreeMap<PathBuf, Vec<FileChangeType>> {
        let mut changes = BTreeMap::<PathBuf, Vec<FileChangeType>>::new();
        let mut record = |path: &PathBuf, change| changes.entry(path.clone()).or_default().push(change);

        self.conflicted.iter().for_each(|path| record(path, FileChangeType::Conflicted));
        self.staged.iter().for_each(|(path, change)| record(path, FileChangeType::Index(*change)));
        self.modified
            .iter()
            .for_each(|path| record(path, FileChangeType::Workspace(WorkspaceChangeType::Modified)));
        self.deleted
            .iter()
            .for_each(|path| record(path, FileChangeType::Workspace(WorkspaceChangeType::Deleted)));
        self.untracked
            .iter()
            .for_each(|path| record(path, FileChangeType::Workspace(WorkspaceChangeType::Untracked)));

        changes
    }
}

#[derive(new)]
pub struct Status<'r> {
    workspace: &'r Workspace,
    ignore: &'r dyn IgnorePredicate,
}

impl<'r> Status<'r> {
    pub fn report(&self, head: &FileMap, index: &Index) -> Result<StatusReport> {
        let mut report = StatusReport::default();
        let inspector = Inspector::new(self.workspace);

        let conflicted = index.conflicted_paths().into_iter().collect::<FileSet>();
        let expected = index
            .overlay(head.clone())
            .files()
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect::<FileMap>();

        for (path, change) in compare_file_maps(head, &expected) {
            if conflicted.contains(&path) {
                continue;
            }
            let change = match change {
                TreeChangeType::Added(_) => IndexChangeType::Added,
                TreeChangeType::Deleted(_) => IndexChangeType::Deleted,
                TreeChangeType::Modified { .. } => IndexChangeType::Modified,
            };
            report.staged.insert(path, change);
        }

        for path in expected.keys() {
            if conflicted.contains(path) {
                continue;
            }
            match inspector.check_against(path, expected.get(path))? {
                Some(WorkspaceChangeType::Modified) => {
                    report.modified.insert(path.clone());
                }
                Some(WorkspaceChangeType::Deleted) => {
                    report.deleted.insert(path.clone());
                }
                _ => {}
            }
        }

        report.untracked = self
            .workspace
            .list_files(self.ignore)?
            .into_iter()
            .filter(|path| !expected.contains_key(path) && !conflicted.contains(path))
            .collect();
        report.conflicted = conflicted;

        Ok(report)
    }
}
