//! References: HEAD, branches, remote-tracking refs and MERGE_HEAD
//!
//! All refs are small text files under `.surge`:
//!
//! - `HEAD` holds `ref: refs/heads/<branch>` or a literal commit id (detached)
//! - `refs/heads/<branch>` holds the branch tip, or nothing for an unborn branch
//! - `refs/remotes/<remote>/<branch>` records the last fetched remote tip
//! - `MERGE_HEAD` names the commit being merged while conflicts are outstanding
//!
//! HEAD is followed exactly one level; branch files may only hold ids.
//! Every write replaces the whole file atomically, and callers hold the
//! repository lock around read-modify-write sequences.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{HEADS_PREFIX, REMOTES_PREFIX};
use crate::artifacts::core::write_atomically;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use derive_new::new;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

const SYMREF_REGEX: &str = r"^ref: (.+)$";

static SYMREF: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(SYMREF_REGEX).ok());

pub const HEAD_REF_NAME: &str = "HEAD";
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";

/// Where HEAD currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadTarget {
    Branch(BranchName),
    Detached(ObjectId),
}

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .io_context(|| format!("unable to read ref {}", path.display()))?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let symref = SYMREF
            .as_ref()
            .and_then(|regex| regex.captures(content))
            .map(|captures| captures[1].to_string());

        match symref {
            Some(target) => Ok(Some(SymRefOrOid::SymRef(target))),
            None => ObjectId::try_parse(content.to_string())
                .map(|oid| Some(SymRefOrOid::Oid(oid)))
                .map_err(|error| Error::corrupt_file(path, error)),
        }
    }
}

/// Branch name plus its tip, `None` for an unborn branch
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct BranchRef {
    pub name: BranchName,
    pub oid: Option<ObjectId>,
}

#[derive(Debug, new)]
pub struct Refs {
    /// The `.surge` directory
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn merge_head_path(&self) -> PathBuf {
        self.path.join(MERGE_HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join(HEADS_PREFIX)
    }

    pub fn remotes_path(&self) -> PathBuf {
        self.path.join(REMOTES_PREFIX)
    }

    fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.path.join(name.to_ref_path())
    }

    pub fn read_head_target(&self) -> Result<HeadTarget> {
        let head_path = self.head_path();

        match SymRefOrOid::read(&head_path)? {
            Some(SymRefOrOid::SymRef(target)) => {
                let branch = target
                    .strip_prefix(HEADS_PREFIX)
                    .ok_or_else(|| {
                        Error::corrupt_file(&head_path, format!("HEAD points outside {HEADS_PREFIX}: {target}"))
                    })
                    .and_then(|name| {
                        BranchName::try_parse(name).map_err(|error| Error::corrupt_file(&head_path, error))
                    })?;

                Ok(HeadTarget::Branch(branch))
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(HeadTarget::Detached(oid)),
            None => Err(Error::corrupt_file(&head_path, "HEAD is missing or empty")),
        }
    }

    /// Commit HEAD resolves to, `None` while the current branch is unborn
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        match self.read_head_target()? {
            HeadTarget::Branch(name) => self.read_branch_file(&name),
            HeadTarget::Detached(oid) => Ok(Some(oid)),
        }
    }

    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        Ok(match self.read_head_target()? {
            HeadTarget::Branch(name) => Some(name),
            HeadTarget::Detached(_) => None,
        })
    }

    pub fn is_current_branch(&self, name: &BranchName) -> Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(name))
    }

    pub fn set_head_branch(&self, name: &BranchName) -> Result<()> {
        write_atomically(
            &self.head_path(),
            format!("ref: {}\n", name.to_ref_path().display()).as_bytes(),
        )
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        write_atomically(&self.head_path(), format!("{oid}\n").as_bytes())
    }

    /// Advance whatever HEAD points at: the current branch, or HEAD itself when detached
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.read_head_target()? {
            HeadTarget::Branch(name) => {
                tracing::debug!(branch = %name, %oid, "advancing branch");
                self.write_branch(&name, Some(oid))
            }
            HeadTarget::Detached(_) => {
                tracing::debug!(%oid, "advancing detached HEAD");
                self.set_head_detached(oid)
            }
        }
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Tip of an existing branch; `None` while it is unborn
    pub fn read_branch(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        if !self.branch_exists(name) {
            return Err(Error::BranchNotFound(name.to_string()));
        }

        self.read_branch_file(name)
    }

    fn read_branch_file(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        let path = self.branch_path(name);

        match SymRefOrOid::read(&path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) => Err(Error::corrupt_file(&path, "branch refs may not be symbolic")),
            None => Ok(None),
        }
    }

    /// Write a branch tip; `None` records an unborn branch
    pub fn write_branch(&self, name: &BranchName, oid: Option<&ObjectId>) -> Result<()> {
        let content = oid.map(|oid| format!("{oid}\n")).unwrap_or_default();
        write_atomically(&self.branch_path(name), content.as_bytes())
    }

    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(Error::rejected(format!("a branch named {name} already exists")));
        }

        self.write_branch(name, Some(oid))
    }

    /// Remove a branch, returning its former tip
    pub fn delete_branch(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        let oid = self.read_branch(name)?;
        let path = self.branch_path(name);

        std::fs::remove_file(&path).io_context(|| format!("unable to delete {}", path.display()))?;
        self.prune_empty_parent_dirs(&path, &self.heads_path())?;

        Ok(oid)
    }

    pub fn list_branches(&self) -> Result<Vec<BranchRef>> {
        let heads = self.heads_path();

        self.list_names(&heads)?
            .into_iter()
            .map(|name| {
                let oid = self.read_branch_file(&name)?;
                Ok(BranchRef::new(name, oid))
            })
            .collect()
    }

    fn list_names(&self, root: &Path) -> Result<Vec<BranchName>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .ok()
                .and_then(|relative| relative.to_str());
            // leftovers such as temp files are not valid names
            if let Some(name) = relative.and_then(|relative| BranchName::try_parse(relative).ok()) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    pub fn read_merge_head(&self) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read(&self.merge_head_path())? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) => Err(Error::corrupt_file(
                &self.merge_head_path(),
                "MERGE_HEAD may not be symbolic",
            )),
            None => Ok(None),
        }
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> Result<()> {
        write_atomically(&self.merge_head_path(), format!("{oid}\n").as_bytes())
    }

    pub fn clear_merge_head(&self) -> Result<()> {
        let path = self.merge_head_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Io {
                context: format!("unable to remove {}", path.display()),
                source,
            }),
        }
    }

    fn remote_ref_path(&self, remote: &str, branch: &BranchName) -> Result<PathBuf> {
        let remote = BranchName::try_parse(remote)
            .map_err(|_| Error::rejected(format!("invalid remote name: {remote}")))?;
        if remote.as_ref().contains('/') {
            return Err(Error::rejected(format!("invalid remote name: {remote}")));
        }

        Ok(self.remotes_path().join(remote.as_ref()).join(branch.as_ref()))
    }

    pub fn read_remote_ref(&self, remote: &str, branch: &BranchName) -> Result<Option<ObjectId>> {
        let path = self.remote_ref_path(remote, branch)?;

        match SymRefOrOid::read(&path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) => Err(Error::corrupt_file(&path, "remote refs may not be symbolic")),
            None => Ok(None),
        }
    }

    pub fn update_remote_ref(&self, remote: &str, branch: &BranchName, oid: &ObjectId) -> Result<()> {
        let path = self.remote_ref_path(remote, branch)?;
        write_atomically(&path, format!("{oid}\n").as_bytes())
    }

    fn prune_empty_parent_dirs(&self, path: &Path, stop_at: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != stop_at
            && parent.starts_with(stop_at)
            && parent
                .read_dir()
                .io_context(|| format!("unable to read {}", parent.display()))?
                .next()
                .is_none()
        {
            std::fs::remove_dir(parent)
                .io_context(|| format!("unable to remove empty directory {}", parent.display()))?;
            self.prune_empty_parent_dirs(parent, stop_at)?;
        }

        Ok(())
    }
}
