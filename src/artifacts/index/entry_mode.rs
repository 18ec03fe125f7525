use crate::errors::{Error, Result};
use is_executable::IsExecutable;
use std::path::Path;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

impl FileMode {
    /// Mode of an existing working-copy file
    pub fn of(path: &Path) -> Self {
        if path.is_executable() {
            FileMode::Executable
        } else {
            FileMode::Regular
        }
    }

    /// Unix permission bits applied when materialising a file
    pub fn permissions(&self) -> u32 {
        match self {
            FileMode::Regular => 0o644,
            FileMode::Executable => 0o755,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn from_octal_str(mode: &str) -> Result<Self> {
        u32::from_str_radix(mode, 8)
            .map_err(|_| Error::malformed(format!("invalid entry mode {mode:?}")))
            .and_then(EntryMode::try_from)
    }

    pub fn file_mode(&self) -> Option<FileMode> {
        match self {
            EntryMode::File(mode) => Some(*mode),
            EntryMode::Directory => None,
        }
    }
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = Error;

    fn try_from(mode: u32) -> Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o40000 => Ok(EntryMode::Directory),
            other => Err(Error::malformed(format!("invalid entry mode {other:o}"))),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}
