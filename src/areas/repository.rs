//! Repository handle
//!
//! A [`Repository`] ties together the object store, refs, staging index,
//! working copy, ignore rules and the repository lock of one working
//! directory. It carries no process-wide state; every operation goes through
//! an explicit handle.
//!
//! Operations live in `commands::porcelain` and `commands::plumbing` as
//! further `impl Repository` blocks. The mutating ones are `async` because
//! waiting for the repository lock is their only suspension point.

use crate::areas::config::RepositoryConfig;
use crate::areas::database::{Database, FileMap};
use crate::areas::index::Index;
use crate::areas::lock::{LockGuard, RepoLock};
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::REPOSITORY_DIR;
use crate::artifacts::ignore::{IGNORE_FILE_NAME, IgnorePredicate, IgnoreRules};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const OBJECTS_DIR: &str = "objects";
pub const INDEX_FILE: &str = "index";
pub const LOCK_FILE: &str = "lock";

#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    config: RepositoryConfig,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    lock: RepoLock,
    ignore: Box<dyn IgnorePredicate>,
}

impl Repository {
    /// Open an initialised repository rooted at `path`
    pub fn open(path: &Path, config: RepositoryConfig) -> Result<Self> {
        let path = path
            .canonicalize()
            .io_context(|| format!("unable to resolve {}", path.display()))?;

        let surge_path = path.join(REPOSITORY_DIR);
        if !surge_path.is_dir() {
            return Err(Error::rejected(format!(
                "not a surge repository: {}",
                path.display()
            )));
        }

        let ignore = IgnoreRules::load(&surge_path.join(IGNORE_FILE_NAME))?;

        Ok(Repository {
            index: Arc::new(Mutex::new(Index::new(surge_path.join(INDEX_FILE).into_boxed_path()))),
            database: Database::loose(surge_path.join(OBJECTS_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(surge_path.clone().into_boxed_path()),
            lock: RepoLock::new(surge_path.join(LOCK_FILE), config.lock_policy()),
            ignore: Box::new(ignore),
            path: path.into_boxed_path(),
            config,
        })
    }

    /// Swap the ignore rules read from `.surgeignore` for another predicate
    pub fn with_ignore(mut self, ignore: Box<dyn IgnorePredicate>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn surge_path(&self) -> PathBuf {
        self.path.join(REPOSITORY_DIR)
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn ignore(&self) -> &dyn IgnorePredicate {
        self.ignore.as_ref()
    }

    pub fn repo_lock(&self) -> &RepoLock {
        &self.lock
    }

    /// Enter the critical section shared by every mutating operation
    pub async fn lock(&self) -> Result<LockGuard> {
        self.lock.acquire().await
    }

    /// Fresh copy of the on-disk index, for read-only inspection
    pub fn load_index(&self) -> Result<Index> {
        let mut index = Index::new(self.surge_path().join(INDEX_FILE).into_boxed_path());
        index.rehydrate()?;

        Ok(index)
    }

    /// Snapshot recorded by HEAD; empty on an unborn branch
    pub fn head_files(&self) -> Result<FileMap> {
        let head = self.refs.read_head()?;
        self.database.commit_files(head.as_ref())
    }

    /// Commit named by a revision; `None` for an unborn branch
    pub fn resolve_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        Revision::try_parse(name)?.resolve(&self.refs, &self.database)
    }

    /// Like [`Repository::resolve_ref`], but an unborn branch is an error
    pub fn resolve_commit(&self, name: &str) -> Result<ObjectId> {
        self.resolve_ref(name)?
            .ok_or_else(|| Error::RevisionNotFound(name.to_string()))
    }
}
