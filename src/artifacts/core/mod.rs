//! Shared utilities: atomic file replacement and the pager adapter

use crate::errors::{Error, IoContext, Result};
use derive_new::new;
use fake::rand;
use minus::Pager;
use std::io::{self, Write};
use std::path::Path;

/// Name of the directory holding objects, refs, the index and the lock
pub const REPOSITORY_DIR: &str = ".surge";

/// Replace `path` with `content` by writing a sibling temp file and renaming it
///
/// Readers never observe a half-written file; a crash leaves at most a stray
/// temp file behind.
pub fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::rejected(format!("{} has no parent directory", path.display())))?;
    std::fs::create_dir_all(parent)
        .io_context(|| format!("unable to create directory {}", parent.display()))?;

    let temp_path = parent.join(format!(".tmp-{}", rand::random::<u32>()));
    let written = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .and_then(|mut file| {
            file.write_all(content)?;
            file.sync_all()
        })
        .io_context(|| format!("unable to write {}", temp_path.display()));

    if let Err(error) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(error);
    }

    std::fs::rename(&temp_path, path).io_context(|| format!("unable to replace {}", path.display()))
}

/// Adapts the minus pager to `std::io::Write`
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl PagerWriter {
    pub fn pager(&self) -> &Pager {
        &self.pager
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(text).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
