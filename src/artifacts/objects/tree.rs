//! Tree object and bottom-up tree construction
//!
//! A tree is one directory level: a set of `(name, mode, oid)` entries.
//!
//! On disk: `tree <size>\0<entries>`, each entry `<octal mode> <name>\0<20-byte oid>`.
//!
//! Entries are kept in a map keyed by name, with directories keyed as
//! `name/`, so serialization order is canonical no matter how entries were
//! inserted. [`TreeBuilder`] turns a flat list of file paths into nested trees,
//! hashing each directory before its parent.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode == EntryMode::Directory
    }

    fn sort_key(&self) -> String {
        match self.mode {
            EntryMode::Directory => format!("{}/", self.name),
            EntryMode::File(_) => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Add an entry, replacing any entry of the same kind and name
    ///
    /// A file and a directory may not share a name within one tree.
    pub fn insert(&mut self, entry: TreeEntry) -> Result<()> {
        if entry.name.is_empty()
            || entry.name == "."
            || entry.name == ".."
            || entry.name.contains(['/', '\0'])
        {
            return Err(Error::rejected(format!(
                "invalid tree entry name {:?}",
                entry.name
            )));
        }

        let rival_key = match entry.mode {
            EntryMode::Directory => entry.name.clone(),
            EntryMode::File(_) => format!("{}/", entry.name),
        };
        if self.entries.contains_key(&rival_key) {
            return Err(Error::rejected(format!(
                "{} is used both as a file and as a directory",
                entry.name
            )));
        }

        self.entries.insert(entry.sort_key(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .get(name)
            .or_else(|| self.entries.get(&format!("{name}/")))
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = Vec::new();

        for entry in self.entries.values() {
            write!(content, "{:o} {}", entry.mode.as_u32(), entry.name)?;
            content.push(0);
            entry.oid.write_h40_to(&mut content)?;
        }

        Ok(frame(ObjectType::Tree, &content))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut tree = Tree::default();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            if reader.read_until(b' ', &mut mode_bytes)? == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(Error::malformed("unexpected end of tree in entry mode"));
            }
            let mode = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::malformed("tree entry mode is not utf-8"))?;
            let mode = EntryMode::from_octal_str(mode)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(Error::malformed("unexpected end of tree in entry name"));
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| Error::malformed("tree entry name is not utf-8"))?;

            let oid = ObjectId::read_h40_from(&mut reader)?;

            tree.insert(TreeEntry::new(name, mode, oid))
                .map_err(|error| Error::malformed(error.to_string()))?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .values()
            .map(|entry| {
                let object_type = if entry.is_tree() {
                    ObjectType::Tree
                } else {
                    ObjectType::Blob
                };

                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    object_type,
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds nested trees from a flat set of file paths
///
/// Each directory is serialized and handed to the caller's store function
/// before its parent, deepest directories first, so the id of every child tree
/// is known by the time its parent is hashed. Directories without files never
/// appear, and an empty builder produces the empty tree.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    files: BTreeMap<PathBuf, (ObjectId, FileMode)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file; a later insert for the same path wins
    pub fn insert(&mut self, path: impl Into<PathBuf>, oid: ObjectId, mode: FileMode) -> Result<()> {
        let path = path.into();
        validate_relative_path(&path)?;

        self.files.insert(path, (oid, mode));
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> Option<(ObjectId, FileMode)> {
        self.files.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &(ObjectId, FileMode))> {
        self.files.iter()
    }

    /// Hash every directory bottom-up and return the root tree id
    pub fn build<F>(&self, mut store: F) -> Result<ObjectId>
    where
        F: FnMut(&Tree) -> Result<ObjectId>,
    {
        let mut directories = BTreeMap::<PathBuf, Tree>::new();
        directories.insert(PathBuf::new(), Tree::default());

        for (path, (oid, mode)) in &self.files {
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            for ancestor in parent.ancestors() {
                directories.entry(ancestor.to_path_buf()).or_default();
            }

            let tree = directories
                .get_mut(&parent)
                .ok_or_else(|| Error::rejected(format!("no directory for {}", path.display())))?;
            tree.insert(TreeEntry::new(
                file_name(path)?,
                EntryMode::File(*mode),
                oid.clone(),
            ))?;
        }

        let mut pending = directories.keys().cloned().collect::<Vec<_>>();
        pending.sort_by_key(|path| std::cmp::Reverse(path.components().count()));

        for directory in pending {
            if directory.as_os_str().is_empty() {
                continue;
            }

            let tree = directories.remove(&directory).unwrap_or_default();
            let oid = store(&tree)?;

            let parent = directory.parent().map(Path::to_path_buf).unwrap_or_default();
            directories
                .entry(parent)
                .or_default()
                .insert(TreeEntry::new(file_name(&directory)?, EntryMode::Directory, oid))?;
        }

        let root = directories.remove(Path::new("")).unwrap_or_default();
        store(&root)
    }
}

impl FromIterator<(PathBuf, ObjectId, FileMode)> for TreeBuilder {
    fn from_iter<I: IntoIterator<Item = (PathBuf, ObjectId, FileMode)>>(iter: I) -> Self {
        let files = iter
            .into_iter()
            .map(|(path, oid, mode)| (path, (oid, mode)))
            .collect();

        TreeBuilder { files }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::rejected(format!("invalid path {}", path.display())))
}

/// Paths recorded in trees and the index are relative and made only of plain names
pub fn validate_relative_path(path: &Path) -> Result<()> {
    let plain = !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(name) if name.to_str().is_some()));

    if plain {
        Ok(())
    } else {
        Err(Error::rejected(format!(
            "{} is not a relative repository path",
            path.display()
        )))
    }
}
