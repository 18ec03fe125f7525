//! Staging index
//!
//! The index records the changes that go into the next commit, on top of the
//! HEAD snapshot: files to write (`Staged`), files to delete (`Removed`) and
//! files still carrying merge conflict markers (`Conflicted`). It is emptied
//! after every successful commit.
//!
//! ## File format
//!
//! - header: signature, version and entry count
//! - entries, sorted by path
//! - SHA-1 checksum of everything before it
//!
//! ## Data structures
//!
//! - `entries`: entries keyed by path
//! - `children`: directory path to the entries below it, so that staging a
//!   file where a directory used to be (or the reverse) drops the rival entries

use crate::areas::database::{Database, FileMap};
use crate::artifacts::core::write_atomically;
use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::{ENTRY_FIXED_SIZE, EntryState, EntryTimestamp, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{TreeBuilder, validate_relative_path};
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Result of staging one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Staged(ObjectId),
    /// A tracked file missing from the working copy; its deletion is staged
    Removed,
    /// Nothing left to commit for the path: it vanished before ever being
    /// committed, or its content matches HEAD again
    Unstaged,
    /// The ignore rules exclude the path; nothing was stored
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Index {
    /// Location of the index file (`.surge/index`)
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by path
    pub fn snapshot(&self) -> Vec<IndexEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries.values().any(IndexEntry::is_conflicted)
    }

    pub fn conflicted_paths(&self) -> Vec<PathBuf> {
        self.entries
            .values()
            .filter(|entry| entry.is_conflicted())
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
        self.children.clear();
    }

    /// Replace the in-memory state with the file on disk; a missing or empty file is an empty index
    pub fn rehydrate(&mut self) -> Result<()> {
        self.entries.clear();
        self.children.clear();
        self.changed = false;

        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(Error::Io {
                    context: format!("unable to read index {}", self.path.display()),
                    source,
                });
            }
        };
        if content.is_empty() {
            return Ok(());
        }

        self.parse(&content)
            .map_err(|error| Error::corrupt_file(&self.path, error))
    }

    fn parse(&mut self, content: &[u8]) -> Result<()> {
        let mut reader = Checksum::new(Cursor::new(content));

        let header = IndexHeader::deserialize(Cursor::new(reader.read(HEADER_SIZE)?))?;
        header.validate()?;

        for _ in 0..header.entries_count {
            let fixed = reader.read(ENTRY_FIXED_SIZE)?;
            let path_len = u16::from_be_bytes([fixed[ENTRY_FIXED_SIZE - 2], fixed[ENTRY_FIXED_SIZE - 1]]);
            let path = reader.read(path_len as usize)?;

            let entry_bytes = [&fixed[..], &path[..]].concat();
            let entry = IndexEntry::deserialize(Cursor::new(entry_bytes))?;
            self.store_entry(entry);
        }

        reader.verify()
    }

    /// Persist the index if anything changed since it was loaded
    pub fn write_updates(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut writer = Checksum::new(Vec::new());
        writer.write(&IndexHeader::with_count(self.entries.len() as u32).serialize()?)?;
        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }
        writer.write_checksum()?;

        write_atomically(&self.path, &writer.into_inner())?;
        tracing::debug!(entries = self.entries.len(), "index written");
        self.changed = false;

        Ok(())
    }

    /// Hash `data` into the object store and stage it at `path`, unless `path` is ignored
    pub fn add(
        &mut self,
        database: &Database,
        ignore: &dyn IgnorePredicate,
        path: &Path,
        data: &[u8],
        mode: FileMode,
    ) -> Result<AddOutcome> {
        validate_relative_path(path)?;
        if ignore.is_ignored(path) {
            tracing::debug!(path = %path.display(), "skipping ignored path");
            return Ok(AddOutcome::Ignored);
        }

        let oid = database.put(data)?;
        self.upsert(IndexEntry::staged(path.to_path_buf(), oid.clone(), mode, EntryTimestamp::now()))?;

        Ok(AddOutcome::Staged(oid))
    }

    /// Insert or replace the entry for a path, dropping entries it displaces as file or directory
    pub fn upsert(&mut self, entry: IndexEntry) -> Result<()> {
        validate_relative_path(&entry.path)?;

        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;

        Ok(())
    }

    /// Record that a tracked file disappears in the next commit
    ///
    /// Unlike [`Index::upsert`] the entries around the path stay: a file staged
    /// where the removed file's directory used to be is still committed.
    pub fn stage_removal(&mut self, path: &Path, oid: ObjectId, mode: FileMode) -> Result<()> {
        validate_relative_path(path)?;

        self.store_entry(IndexEntry::removed(path.to_path_buf(), oid, mode));
        self.changed = true;

        Ok(())
    }

    /// Stage conflict-marker content so the next commit is refused until it is re-added
    pub fn mark_conflicted(&mut self, path: &Path, oid: ObjectId, mode: FileMode) -> Result<()> {
        self.upsert(IndexEntry::conflicted(path.to_path_buf(), oid, mode))
    }

    /// Unstage a path, or everything below it when it names a directory
    pub fn remove(&mut self, path: &Path) -> bool {
        let removed = self.remove_entry(path) | self.remove_children(path);
        if removed {
            self.changed = true;
        }

        removed
    }

    /// Apply the staged changes to a snapshot
    pub fn overlay(&self, mut files: FileMap) -> TreeBuilder {
        for entry in self.entries.values() {
            match entry.state {
                EntryState::Removed => {
                    files.remove(&entry.path);
                }
                EntryState::Staged | EntryState::Conflicted => {
                    for parent in entry.parent_dirs() {
                        files.remove(parent);
                    }
                    files.retain(|path, _| !path.starts_with(&entry.path) || path == &entry.path);
                    files.insert(entry.path.clone(), (entry.oid.clone(), entry.mode));
                }
            }
        }

        files
            .into_iter()
            .map(|(path, (oid, mode))| (path, oid, mode))
            .collect()
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.path);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf())
                .or_default()
                .insert(entry.path.clone());
        }

        self.entries.insert(entry.path.clone(), entry);
    }

    fn remove_children(&mut self, path: &Path) -> bool {
        match self.children.remove(path) {
            Some(children) => {
                for child in children {
                    self.remove_entry(&child);
                }
                true
            }
            None => false,
        }
    }

    fn remove_entry(&mut self, path: &Path) -> bool {
        let Some(entry) = self.entries.remove(path) else {
            return false;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }

        true
    }
}
