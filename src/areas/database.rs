//! Content-addressed object database
//!
//! Objects are immutable and keyed by the SHA-1 of their framed record, so
//! storing is idempotent and safe to race: two writers of the same content
//! compute the same id and the same bytes.

use crate::areas::backend::{LooseObjects, MemoryObjects, ObjectBackend};
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeBuilder};
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Files of a snapshot keyed by repository-relative path
pub type FileMap = BTreeMap<PathBuf, (ObjectId, FileMode)>;

#[derive(Debug)]
pub struct Database {
    backend: Box<dyn ObjectBackend>,
}

impl Database {
    pub fn new(backend: Box<dyn ObjectBackend>) -> Self {
        Database { backend }
    }

    /// Loose objects rooted at `path` (usually `.surge/objects`)
    pub fn loose(path: Box<Path>) -> Self {
        Self::new(Box::new(LooseObjects::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryObjects::new()))
    }

    /// Store raw bytes as a blob
    pub fn put(&self, data: &[u8]) -> Result<ObjectId> {
        self.store_record(&frame(ObjectType::Blob, data))
    }

    /// Payload of any object, without its header
    pub fn get(&self, oid: &ObjectId) -> Result<Bytes> {
        let (_, mut reader) = self.open_object(oid)?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        Ok(payload.into())
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.store_record(&object.serialize()?)
    }

    fn store_record(&self, record: &[u8]) -> Result<ObjectId> {
        let oid = ObjectId::hash_record(record);

        if !self.backend.contains(&oid)? {
            self.backend.write(&oid, record)?;
            tracing::trace!(%oid, size = record.len(), "object stored");
        }

        Ok(oid)
    }

    /// Ingest a payload received from elsewhere under the id it was announced with
    ///
    /// The record is re-hashed; a payload that does not hash to `oid` is refused.
    pub fn put_typed(&self, oid: &ObjectId, object_type: ObjectType, data: &[u8]) -> Result<()> {
        let record = frame(object_type, data);
        let actual = ObjectId::hash_record(&record);
        if &actual != oid {
            return Err(Error::corrupt_object(
                oid,
                format!("{object_type} payload hashes to {actual}"),
            ));
        }

        self.store_record(&record).map(|_| ())
    }

    /// Full framed record, as stored
    pub fn load_raw(&self, oid: &ObjectId) -> Result<Bytes> {
        self.backend.read(oid)
    }

    pub fn contains(&self, oid: &ObjectId) -> Result<bool> {
        self.backend.contains(oid)
    }

    pub fn object_type(&self, oid: &ObjectId) -> Result<ObjectType> {
        let (object_type, _) = self.open_object(oid)?;
        Ok(object_type)
    }

    fn open_object(&self, oid: &ObjectId) -> Result<(ObjectType, Cursor<Bytes>)> {
        let record = self.load_raw(oid)?;
        let mut reader = Cursor::new(record);

        let (object_type, size) =
            ObjectType::parse_header(&mut reader).map_err(|error| Error::corrupt_object(oid, error))?;

        let remaining = reader.get_ref().len() as u64 - reader.position();
        if remaining != size as u64 {
            return Err(Error::corrupt_object(
                oid,
                format!("header declares {size} bytes but {remaining} follow"),
            ));
        }

        Ok((object_type, reader))
    }

    fn decode<T: Unpackable>(oid: &ObjectId, reader: Cursor<Bytes>) -> Result<T> {
        T::deserialize(reader).map_err(|error| Error::corrupt_object(oid, error))
    }

    pub fn parse_object(&self, oid: &ObjectId) -> Result<ObjectBox> {
        let (object_type, reader) = self.open_object(oid)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Self::decode(oid, reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Self::decode(oid, reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Self::decode(oid, reader)?)),
        })
    }

    fn open_expecting(&self, oid: &ObjectId, expected: ObjectType) -> Result<Cursor<Bytes>> {
        let (object_type, reader) = self.open_object(oid)?;
        if object_type != expected {
            return Err(Error::rejected(format!(
                "object {oid} is a {object_type}, not a {expected}"
            )));
        }

        Ok(reader)
    }

    pub fn parse_object_as_blob(&self, oid: &ObjectId) -> Result<Blob> {
        let reader = self.open_expecting(oid, ObjectType::Blob)?;
        Self::decode(oid, reader)
    }

    pub fn parse_object_as_tree(&self, oid: &ObjectId) -> Result<Tree> {
        let reader = self.open_expecting(oid, ObjectType::Tree)?;
        Self::decode(oid, reader)
    }

    pub fn parse_object_as_commit(&self, oid: &ObjectId) -> Result<Commit> {
        let reader = self.open_expecting(oid, ObjectType::Commit)?;
        Self::decode(oid, reader)
    }

    pub fn slim_commit(&self, oid: &ObjectId) -> Result<SlimCommit> {
        Ok(self.parse_object_as_commit(oid)?.to_slim(oid.clone()))
    }

    /// Every stored id starting with `prefix`, sorted
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        self.backend.find_by_prefix(prefix)
    }

    /// Store every directory level of `builder` and return the root tree id
    pub fn write_tree(&self, builder: &TreeBuilder) -> Result<ObjectId> {
        let root = builder.build(|tree| self.store(tree))?;
        tracing::debug!(%root, files = builder.files().count(), "tree written");

        Ok(root)
    }

    /// All files below a tree, recursively; `None` is the empty snapshot
    pub fn flatten_tree(&self, tree_oid: Option<&ObjectId>) -> Result<FileMap> {
        let mut files = FileMap::new();
        if let Some(tree_oid) = tree_oid {
            self.collect_files(tree_oid, PathBuf::new(), &mut files)?;
        }

        Ok(files)
    }

    fn collect_files(&self, tree_oid: &ObjectId, prefix: PathBuf, files: &mut FileMap) -> Result<()> {
        let tree = self.parse_object_as_tree(tree_oid)?;

        for entry in tree.into_entries() {
            let path = prefix.join(&entry.name);
            match entry.mode {
                EntryMode::Directory => self.collect_files(&entry.oid, path, files)?,
                EntryMode::File(mode) => {
                    files.insert(path, (entry.oid, mode));
                }
            }
        }

        Ok(())
    }

    /// Snapshot recorded by a commit; `None` (unborn branch) is empty
    pub fn commit_files(&self, commit_oid: Option<&ObjectId>) -> Result<FileMap> {
        match commit_oid {
            Some(commit_oid) => {
                let commit = self.parse_object_as_commit(commit_oid)?;
                self.flatten_tree(Some(commit.tree_oid()))
            }
            None => Ok(FileMap::new()),
        }
    }

    /// Objects reachable from `tip` (commits, trees, blobs), skipping commits
    /// for which `known` holds and everything only reachable through them
    pub fn reachable_objects<F>(&self, tip: &ObjectId, known: F) -> Result<Vec<(ObjectId, ObjectType)>>
    where
        F: Fn(&ObjectId) -> bool,
    {
        let mut seen = BTreeSet::new();
        let mut objects = Vec::new();
        let mut commits = VecDeque::from([tip.clone()]);

        while let Some(commit_oid) = commits.pop_front() {
            if known(&commit_oid) || !seen.insert(commit_oid.clone()) {
                continue;
            }

            let commit = self.parse_object_as_commit(&commit_oid)?;
            self.collect_tree_objects(commit.tree_oid(), &mut seen, &mut objects)?;
            objects.push((commit_oid, ObjectType::Commit));
            commits.extend(commit.parents().iter().cloned());
        }

        Ok(objects)
    }

    fn collect_tree_objects(
        &self,
        tree_oid: &ObjectId,
        seen: &mut BTreeSet<ObjectId>,
        objects: &mut Vec<(ObjectId, ObjectType)>,
    ) -> Result<()> {
        if !seen.insert(tree_oid.clone()) {
            return Ok(());
        }

        let tree = self.parse_object_as_tree(tree_oid)?;
        for entry in tree.entries() {
            if entry.is_tree() {
                self.collect_tree_objects(&entry.oid, seen, objects)?;
            } else if seen.insert(entry.oid.clone()) {
                objects.push((entry.oid.clone(), ObjectType::Blob));
            }
        }
        objects.push((tree_oid.clone(), ObjectType::Tree));

        Ok(())
    }
}
