//! Object exchange with another repository
//!
//! A transport moves sets of objects and answers questions about remote
//! branches. [`LocalTransport`] talks to a repository on the same file system.

use crate::areas::database::Database;
use crate::areas::lock::{LockPolicy, RepoLock};
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::REPOSITORY_DIR;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One object in transit: its id, type and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub oid: ObjectId,
    pub object_type: ObjectType,
    pub data: Bytes,
}

pub trait RemoteTransport: Send + Sync + Debug {
    /// Short name used for `refs/remotes/<name>/…`
    fn name(&self) -> &str;

    /// Tip of a branch on the remote; `None` when it is missing or unborn
    fn resolve_remote_ref(&self, branch: &BranchName) -> Result<Option<ObjectId>>;

    /// Objects reachable from `tip`, minus history below commits the caller already has
    fn fetch_objects(&self, tip: &ObjectId, have: &dyn Fn(&ObjectId) -> bool) -> Result<Vec<RemoteObject>>;

    /// Store `objects` remotely, then move `branch` from `expected` to `new`;
    /// fails when the remote branch no longer points at `expected`
    fn push_objects(
        &self,
        objects: Vec<RemoteObject>,
        branch: &BranchName,
        expected: Option<&ObjectId>,
        new: &ObjectId,
    ) -> Result<()>;
}

/// Every object reachable from `tip` in `database`, skipping commits `have` knows
pub fn collect_objects(database: &Database, tip: &ObjectId, have: &dyn Fn(&ObjectId) -> bool) -> Result<Vec<RemoteObject>> {
    database
        .reachable_objects(tip, have)?
        .into_iter()
        .map(|(oid, object_type)| {
            let data = database.get(&oid)?;
            Ok(RemoteObject { oid, object_type, data })
        })
        .collect()
}

/// Store received objects, verifying each id against its content
pub fn ingest_objects(database: &Database, objects: &[RemoteObject]) -> Result<usize> {
    let mut stored = 0;
    for object in objects {
        if database.contains(&object.oid)? {
            continue;
        }

        database.put_typed(&object.oid, object.object_type, &object.data)?;
        stored += 1;
    }

    Ok(stored)
}

/// A repository reachable through the file system
///
/// Pushing updates the remote's branch ref but never its working copy.
#[derive(Debug)]
pub struct LocalTransport {
    name: String,
    root: PathBuf,
    database: Database,
    refs: Refs,
    lock: RepoLock,
}

impl LocalTransport {
    pub fn open(name: impl Into<String>, root: &Path) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(Error::rejected(format!("invalid remote name {name:?}")));
        }

        let surge_dir = root.join(REPOSITORY_DIR);
        if !surge_dir.is_dir() {
            return Err(Error::rejected(format!(
                "{} is not a surge repository",
                root.display()
            )));
        }

        Ok(LocalTransport {
            name,
            root: root.to_path_buf(),
            database: Database::loose(surge_dir.join("objects").into_boxed_path()),
            refs: Refs::new(surge_dir.clone().into_boxed_path()),
            lock: RepoLock::new(surge_dir.join("lock"), LockPolicy::default()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RemoteTransport for LocalTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_remote_ref(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        match self.refs.read_branch(branch) {
            Ok(oid) => Ok(oid),
            Err(Error::BranchNotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn fetch_objects(&self, tip: &ObjectId, have: &dyn Fn(&ObjectId) -> bool) -> Result<Vec<RemoteObject>> {
        let objects = collect_objects(&self.database, tip, have)?;
        debug!(remote = %self.name, %tip, objects = objects.len(), "serving fetch");

        Ok(objects)
    }

    fn push_objects(
        &self,
        objects: Vec<RemoteObject>,
        branch: &BranchName,
        expected: Option<&ObjectId>,
        new: &ObjectId,
    ) -> Result<()> {
        let mut guard = self.lock.try_acquire()?.ok_or_else(|| Error::LockTimeout {
            path: self.lock.path().to_path_buf(),
            attempts: 1,
        })?;

        let stored = ingest_objects(&self.database, &objects)?;

        let current = self.resolve_remote_ref(branch)?;
        if current.as_ref() != expected {
            return Err(Error::rejected(format!(
                "remote branch {branch} moved; fetch and merge before pushing"
            )));
        }
        self.refs.write_branch(branch, Some(new))?;
        guard.release()?;

        info!(remote = %self.name, %branch, %new, stored, "remote branch updated");
        Ok(())
    }
}
