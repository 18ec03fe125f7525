//! Storage engines behind the object database
//!
//! A backend stores framed object records (`<type> <size>\0<payload>`) keyed
//! by their id. It knows nothing about object types; hashing and parsing
//! happen in [`Database`](crate::areas::database::Database).

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use bytes::Bytes;
use fake::rand;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait ObjectBackend: Send + Sync + std::fmt::Debug {
    fn contains(&self, oid: &ObjectId) -> Result<bool>;

    /// Framed record for `oid`, or [`Error::ObjectNotFound`]
    fn read(&self, oid: &ObjectId) -> Result<Bytes>;

    /// Persist a record; writing an id that already exists is a no-op
    fn write(&self, oid: &ObjectId, record: &[u8]) -> Result<()>;

    fn list(&self) -> Result<Vec<ObjectId>>;

    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|oid| oid.as_ref().starts_with(prefix))
            .collect())
    }
}

/// Zlib-compressed files at `objects/ab/cdef…`
#[derive(Debug)]
pub struct LooseObjects {
    path: Box<Path>,
}

impl LooseObjects {
    pub fn new(path: Box<Path>) -> Self {
        LooseObjects { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.path.join(oid.to_path())
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .io_context(|| "unable to compress object content")?;

        encoder
            .finish()
            .io_context(|| "unable to finish compressing object content")
    }

    fn decompress(oid: &ObjectId, data: &[u8]) -> Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|error| Error::corrupt_object(oid, format!("unable to decompress: {error}")))?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    fn scan_dir(&self, dir_name: &str, file_prefix: &str, matches: &mut Vec<ObjectId>) -> Result<()> {
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(());
        }

        let entries = std::fs::read_dir(&dir_path)
            .io_context(|| format!("unable to list {}", dir_path.display()))?;
        for entry in entries {
            let entry = entry.io_context(|| format!("unable to list {}", dir_path.display()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }

        Ok(())
    }
}

impl ObjectBackend for LooseObjects {
    fn contains(&self, oid: &ObjectId) -> Result<bool> {
        let object_path = self.object_path(oid);

        match std::fs::metadata(&object_path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Io {
                context: format!("unable to inspect object file {}", object_path.display()),
                source,
            }),
        }
    }

    fn read(&self, oid: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(oid);

        let compressed = match std::fs::read(&object_path) {
            Ok(compressed) => compressed,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound(oid.clone()));
            }
            Err(source) => {
                return Err(Error::Io {
                    context: format!("unable to read object file {}", object_path.display()),
                    source,
                });
            }
        };

        Self::decompress(oid, &compressed)
    }

    fn write(&self, oid: &ObjectId, record: &[u8]) -> Result<()> {
        let object_path = self.object_path(oid);
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::rejected(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir)
            .io_context(|| format!("unable to create object directory {}", object_dir.display()))?;

        let compressed = Self::compress(record)?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let written = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .and_then(|mut file| file.write_all(&compressed))
            .io_context(|| format!("unable to write object file {}", temp_object_path.display()));
        if let Err(error) = written {
            let _ = std::fs::remove_file(&temp_object_path);
            return Err(error);
        }

        // rename makes the object appear atomically; concurrent writers of the
        // same id produce identical bytes
        std::fs::rename(&temp_object_path, &object_path)
            .io_context(|| format!("unable to rename object file to {}", object_path.display()))
    }

    fn list(&self) -> Result<Vec<ObjectId>> {
        let mut oids = Vec::new();
        for i in 0..=255u8 {
            self.scan_dir(&format!("{i:02x}"), "", &mut oids)?;
        }

        oids.sort();
        Ok(oids)
    }

    /// Prefixes of two or more characters only look inside one fan-out directory
    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 {
            return Ok(self
                .list()?
                .into_iter()
                .filter(|oid| oid.as_ref().starts_with(&prefix))
                .collect());
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let mut matches = Vec::new();
        self.scan_dir(dir_name, file_prefix, &mut matches)?;

        matches.sort();
        Ok(matches)
    }
}

/// Volatile store for tests and scratch work
#[derive(Debug, Default)]
pub struct MemoryObjects {
    objects: Mutex<BTreeMap<ObjectId, Bytes>>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<ObjectId, Bytes>>> {
        self.objects
            .lock()
            .map_err(|_| Error::rejected("in-memory object store was poisoned"))
    }
}

impl ObjectBackend for MemoryObjects {
    fn contains(&self, oid: &ObjectId) -> Result<bool> {
        Ok(self.objects()?.contains_key(oid))
    }

    fn read(&self, oid: &ObjectId) -> Result<Bytes> {
        self.objects()?
            .get(oid)
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound(oid.clone()))
    }

    fn write(&self, oid: &ObjectId, record: &[u8]) -> Result<()> {
        self.objects()?
            .entry(oid.clone())
            .or_insert_with(|| Bytes::copy_from_slice(record));
        Ok(())
    }

    fn list(&self) -> Result<Vec<ObjectId>> {
        Ok(self.objects()?.keys().cloned().collect())
    }
}
