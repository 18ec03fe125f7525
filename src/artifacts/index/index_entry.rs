//! Staging entry representation
//!
//! Each entry records one path that differs, or will differ, from the
//! current HEAD tree in the next commit.
//!
//! ## Entry Format
//!
//! ```text
//! state      u8    0 = staged, 1 = removed, 2 = conflicted
//! mode       u32   octal file mode
//! mtime      i64   seconds since the Unix epoch
//! mtime_nsec u32
//! oid        20 raw bytes
//! path_len   u16
//! path       path_len bytes of UTF-8
//! ```

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::validate_relative_path;
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Size of the fixed part of a serialized entry, before the path bytes
pub const ENTRY_FIXED_SIZE: usize = 1 + 4 + 8 + 4 + 20 + 2;

/// Longest path an entry can hold
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// New or changed content for the next commit
    Staged,
    /// The path is deleted in the next commit
    Removed,
    /// The path still holds unresolved merge conflict markers
    Conflicted,
}

impl EntryState {
    fn as_u8(&self) -> u8 {
        match self {
            EntryState::Staged => 0,
            EntryState::Removed => 1,
            EntryState::Conflicted => 2,
        }
    }
}

impl TryFrom<u8> for EntryState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EntryState::Staged),
            1 => Ok(EntryState::Removed),
            2 => Ok(EntryState::Conflicted),
            other => Err(Error::malformed(format!("invalid entry state {other}"))),
        }
    }
}

/// Modification time of the working-copy file when it was staged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct EntryTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl EntryTimestamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        EntryTimestamp {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    pub fn of(metadata: &std::fs::Metadata) -> Self {
        metadata
            .modified()
            .ok()
            .and_then(|modified| modified.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|since_epoch| EntryTimestamp {
                seconds: since_epoch.as_secs() as i64,
                nanos: since_epoch.subsec_nanos(),
            })
            .unwrap_or_else(Self::now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub path: PathBuf,
    pub oid: ObjectId,
    pub mode: FileMode,
    pub timestamp: EntryTimestamp,
    pub state: EntryState,
}

impl IndexEntry {
    pub fn staged(path: PathBuf, oid: ObjectId, mode: FileMode, timestamp: EntryTimestamp) -> Self {
        Self::new(path, oid, mode, timestamp, EntryState::Staged)
    }

    pub fn removed(path: PathBuf, oid: ObjectId, mode: FileMode) -> Self {
        Self::new(path, oid, mode, EntryTimestamp::now(), EntryState::Removed)
    }

    pub fn conflicted(path: PathBuf, oid: ObjectId, mode: FileMode) -> Self {
        Self::new(path, oid, mode, EntryTimestamp::now(), EntryState::Conflicted)
    }

    pub fn is_conflicted(&self) -> bool {
        self.state == EntryState::Conflicted
    }

    pub fn basename(&self) -> Result<&str> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::rejected(format!("invalid file name {}", self.path.display())))
    }

    /// Every proper ancestor directory of the entry, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .path
            .ancestors()
            .skip(1)
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();
        dirs
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let path = self
            .path
            .to_str()
            .ok_or_else(|| Error::rejected(format!("{} is not utf-8", self.path.display())))?;
        if path.len() > MAX_PATH_SIZE {
            return Err(Error::rejected(format!("path {path} is too long")));
        }

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + path.len());
        bytes.write_u8(self.state.as_u8())?;
        bytes.write_u32::<NetworkEndian>(EntryMode::File(self.mode).as_u32())?;
        bytes.write_i64::<NetworkEndian>(self.timestamp.seconds)?;
        bytes.write_u32::<NetworkEndian>(self.timestamp.nanos)?;
        self.oid.write_h40_to(&mut bytes)?;
        bytes.write_u16::<NetworkEndian>(path.len() as u16)?;
        bytes.extend_from_slice(path.as_bytes());

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::malformed("index entry is truncated");

        let state = EntryState::try_from(reader.read_u8().map_err(truncated)?)?;
        let mode = EntryMode::try_from(reader.read_u32::<NetworkEndian>().map_err(truncated)?)?
            .file_mode()
            .ok_or_else(|| Error::malformed("index entry cannot be a directory"))?;
        let seconds = reader.read_i64::<NetworkEndian>().map_err(truncated)?;
        let nanos = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let oid = ObjectId::read_h40_from(&mut reader)?;
        let path_len = reader.read_u16::<NetworkEndian>().map_err(truncated)? as usize;

        let mut path = vec![0u8; path_len];
        reader.read_exact(&mut path).map_err(truncated)?;
        let path = PathBuf::from(
            String::from_utf8(path).map_err(|_| Error::malformed("index entry path is not utf-8"))?,
        );
        validate_relative_path(&path).map_err(|error| Error::malformed(error.to_string()))?;

        Ok(IndexEntry {
            path,
            oid,
            mode,
            timestamp: EntryTimestamp::new(seconds, nanos),
            state,
        })
    }
}
