use crate::areas::database::{Database, FileMap};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntry;
use crate::errors::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChangeType {
    Added(DatabaseEntry),
    Deleted(DatabaseEntry),
    Modified { old: DatabaseEntry, new: DatabaseEntry },
}

impl TreeChangeType {
    pub fn from_entries(old: Option<DatabaseEntry>, new: Option<DatabaseEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new)),
            (Some(old), None) => Some(TreeChangeType::Deleted(old)),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified { old, new }),
            _ => None,
        }
    }

    pub fn old_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Deleted(entry) => Some(entry),
            TreeChangeType::Modified { old, .. } => Some(old),
            TreeChangeType::Added(_) => None,
        }
    }

    pub fn new_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Added(entry) => Some(entry),
            TreeChangeType::Modified { new, .. } => Some(new),
            TreeChangeType::Deleted(_) => None,
        }
    }

    pub fn status_char(&self) -> char {
        match self {
            TreeChangeType::Added(_) => 'A',
            TreeChangeType::Deleted(_) => 'D',
            TreeChangeType::Modified { .. } => 'M',
        }
    }
}

pub type ChangeSet = BTreeMap<PathBuf, TreeChangeType>;

type TreeEntryMap = BTreeMap<String, TreeEntry>;

/// Changes between two flat snapshots
pub fn compare_file_maps(old: &FileMap, new: &FileMap) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (path, entry) in old {
        let old_entry = Some(DatabaseEntry::from(entry.clone()));
        let new_entry = new.get(path).cloned().map(DatabaseEntry::from);
        if let Some(change) = TreeChangeType::from_entries(old_entry, new_entry) {
            changes.insert(path.clone(), change);
        }
    }

    for (path, entry) in new {
        if !old.contains_key(path) {
            changes.insert(path.clone(), TreeChangeType::Added(entry.clone().into()));
        }
    }

    changes
}

/// Recursive comparison of stored trees that skips identical subtrees by id
#[derive(Debug)]
pub struct TreeDiff<'r> {
    database: &'r Database,
    change_set: ChangeSet,
}

impl<'r> TreeDiff<'r> {
    pub fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            change_set: BTreeMap::new(),
        }
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.change_set
    }

    pub fn into_changes(self) -> ChangeSet {
        self.change_set
    }

    /// Compare two commits or trees; `None` stands for the empty snapshot
    pub fn compare_oids(&mut self, old: Option<&ObjectId>, new: Option<&ObjectId>, prefix: &Path) -> Result<()> {
        if old == new {
            return Ok(());
        }

        let old_entries = self.inflate_oid_to_tree_entries(old)?;
        let new_entries = self.inflate_oid_to_tree_entries(new)?;

        self.detect_deletions(&old_entries, &new_entries, prefix)?;
        self.detect_additions(&old_entries, &new_entries, prefix)?;

        Ok(())
    }

    fn inflate_oid_to_tree_entries(&self, oid: Option<&ObjectId>) -> Result<TreeEntryMap> {
        let Some(oid) = oid else {
            return Ok(TreeEntryMap::new());
        };

        let tree = match self.database.parse_object(oid)? {
            ObjectBox::Tree(tree) => *tree,
            ObjectBox::Commit(commit) => self.database.parse_object_as_tree(commit.tree_oid())?,
            ObjectBox::Blob(_) => return Err(Error::rejected(format!("object {oid} is not a tree"))),
        };

        Ok(tree
            .into_entries()
            .map(|entry| (entry.name.clone(), entry))
            .collect())
    }

    fn blob_entry(entry: &TreeEntry) -> Option<DatabaseEntry> {
        match entry.mode {
            EntryMode::File(mode) => Some(DatabaseEntry::new(entry.oid.clone(), mode)),
            EntryMode::Directory => None,
        }
    }

    fn tree_oid(entry: &TreeEntry) -> Option<&ObjectId> {
        entry.is_tree().then_some(&entry.oid)
    }

    fn detect_deletions(&mut self, old: &TreeEntryMap, new: &TreeEntryMap, prefix: &Path) -> Result<()> {
        for (name, entry) in old {
            let path = prefix.join(name);
            let other = new.get(name);

            if other == Some(entry) {
                continue;
            }

            self.compare_oids(Self::tree_oid(entry), other.and_then(Self::tree_oid), &path)?;

            let blob_a = Self::blob_entry(entry);
            let blob_b = other.and_then(Self::blob_entry);
            if let Some(change) = TreeChangeType::from_entries(blob_a, blob_b) {
                self.change_set.insert(path, change);
            }
        }

        Ok(())
    }

    fn detect_additions(&mut self, old: &TreeEntryMap, new: &TreeEntryMap, prefix: &Path) -> Result<()> {
        for (name, entry) in new {
            if old.contains_key(name) {
                continue;
            }

            let path = prefix.join(name);
            match Self::blob_entry(entry) {
                Some(blob) => {
                    self.change_set.insert(path, TreeChangeType::Added(blob));
                }
                None => self.compare_oids(None, Some(&entry.oid), &path)?,
            }
        }

        Ok(())
    }
}
