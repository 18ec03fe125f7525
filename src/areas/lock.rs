//! Repository-wide advisory lock
//!
//! Every operation that mutates HEAD, branch refs, the staging index or the
//! object store runs while holding an exclusive OS lock on `.surge/lock`.
//! Acquisition never blocks: a contended lock is retried a bounded number of
//! times with a fixed asynchronous wait in between, after which the caller
//! gets [`Error::LockTimeout`].
//!
//! The lock is an `flock`-style lock on an open file description, so it also
//! excludes a second acquisition from within the same process.

use crate::errors::{Error, IoContext, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOCK_RETRIES: u32 = 10;
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_millis(100);

/// Retry budget for lock acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// Attempts made after the first one fails
    pub retries: u32,
    /// Pause between attempts
    pub wait: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        LockPolicy {
            retries: DEFAULT_LOCK_RETRIES,
            wait: DEFAULT_LOCK_WAIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepoLock {
    path: PathBuf,
    policy: LockPolicy,
}

impl RepoLock {
    pub fn new(path: PathBuf, policy: LockPolicy) -> Self {
        RepoLock { path, policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    pub async fn acquire(&self) -> Result<LockGuard> {
        let attempts = self.policy.retries.saturating_add(1);

        for attempt in 1..=attempts {
            if let Some(guard) = self.try_acquire()? {
                tracing::trace!(path = %self.path.display(), attempt, "repository lock acquired");
                return Ok(guard);
            }

            tracing::debug!(path = %self.path.display(), attempt, attempts, "repository lock is busy");
            if attempt < attempts {
                tokio::time::sleep(self.policy.wait).await;
            }
        }

        tracing::warn!(path = %self.path.display(), attempts, "gave up waiting for the repository lock");
        Err(Error::LockTimeout {
            path: self.path.clone(),
            attempts,
        })
    }

    /// Single non-blocking attempt; `None` when another holder has the lock
    pub fn try_acquire(&self) -> Result<Option<LockGuard>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .io_context(|| format!("unable to open lock file {}", self.path.display()))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(LockGuard {
                path: self.path.clone(),
                file: Some(file),
            })),
            Err(error) if error.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(error) => Err(Error::Io {
                context: format!("unable to lock {}", self.path.display()),
                source: error,
            }),
        }
    }
}

/// Held lock; released explicitly or on drop
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    file: Option<File>,
}

impl LockGuard {
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releasing an already released guard is a no-op
    pub fn release(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            FileExt::unlock(&file)
                .io_context(|| format!("unable to unlock {}", self.path.display()))?;
            tracing::trace!(path = %self.path.display(), "repository lock released");
        }

        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}
