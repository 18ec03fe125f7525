use crate::areas::database::Database;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{HEADS_PREFIX, REMOTES_PREFIX};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, ErrorKind, Result};
use regex::Regex;
use std::sync::LazyLock;

const PARENT_REGEX: &str = r"^(.+)\^$";
const ANCESTOR_REGEX: &str = r"^(.+)~(\d+)$";
const HEAD_ALIAS: &str = "@";

static PARENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(PARENT_REGEX).ok());
static ANCESTOR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(ANCESTOR_REGEX).ok());

/// A name that identifies a commit
///
/// Accepted forms:
/// - `HEAD` or its alias `@`
/// - branch names, bare or as `refs/heads/<name>`
/// - remote-tracking refs as `<remote>/<branch>` or `refs/remotes/<remote>/<branch>`
/// - full or abbreviated (4+ hex digits) object ids
/// - `<revision>^` for the first parent and `<revision>~<n>` for the n-th first-parent ancestor
///
/// Refs win over object ids when a name could be both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Ref(String),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let revision = revision.trim();
        if revision.is_empty() {
            return Err(Error::rejected("empty revision"));
        }

        if let Some(captures) = PARENT.as_ref().and_then(|regex| regex.captures(revision)) {
            return Ok(Revision::Parent(Box::new(Self::try_parse(&captures[1])?)));
        }

        if let Some(captures) = ANCESTOR.as_ref().and_then(|regex| regex.captures(revision)) {
            let generations = captures[2]
                .parse::<usize>()
                .map_err(|_| Error::rejected(format!("invalid ancestor count in {revision}")))?;
            return Ok(Revision::Ancestor(Box::new(Self::try_parse(&captures[1])?), generations));
        }

        if revision == HEAD_ALIAS || revision == HEAD_REF_NAME {
            return Ok(Revision::Ref(HEAD_REF_NAME.to_string()));
        }

        BranchName::try_parse(revision)
            .map_err(|_| Error::RevisionNotFound(revision.to_string()))?;
        Ok(Revision::Ref(revision.to_string()))
    }

    /// Commit the revision names; `None` when it names an unborn branch
    pub fn resolve(&self, refs: &Refs, database: &Database) -> Result<Option<ObjectId>> {
        match self {
            Revision::Ref(name) => Self::resolve_ref(name, refs, database),
            Revision::Parent(base) => Self::first_parent(base.resolve(refs, database)?, base, database),
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(refs, database)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(oid, base, database)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_ref(name: &str, refs: &Refs, database: &Database) -> Result<Option<ObjectId>> {
        if name == HEAD_REF_NAME {
            return refs.read_head();
        }

        if let Some(branch) = name.strip_prefix(HEADS_PREFIX) {
            let branch = BranchName::try_parse(branch)?;
            return refs.read_branch(&branch);
        }

        if let Some(remote_ref) = name.strip_prefix(REMOTES_PREFIX) {
            return Self::resolve_remote(remote_ref, refs)?
                .map(Some)
                .ok_or_else(|| Error::RevisionNotFound(name.to_string()));
        }

        let branch = BranchName::try_parse(name)?;
        if refs.branch_exists(&branch) {
            return refs.read_branch(&branch);
        }

        if let Some(oid) = Self::resolve_remote(name, refs)? {
            return Ok(Some(oid));
        }

        if ObjectId::looks_like_prefix(name) {
            return Self::resolve_oid(name, database).map(Some);
        }

        Err(Error::RevisionNotFound(name.to_string()))
    }

    fn resolve_remote(remote_ref: &str, refs: &Refs) -> Result<Option<ObjectId>> {
        let Some((remote, branch)) = remote_ref.split_once('/') else {
            return Ok(None);
        };
        let Ok(branch) = BranchName::try_parse(branch) else {
            return Ok(None);
        };

        match refs.read_remote_ref(remote, &branch) {
            Ok(oid) => Ok(oid),
            Err(error) if error.kind() == ErrorKind::Rejected => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn first_parent(oid: Option<ObjectId>, base: &Revision, database: &Database) -> Result<Option<ObjectId>> {
        let Some(oid) = oid else {
            return Err(Error::RevisionNotFound(base.to_string()));
        };

        database
            .parse_object_as_commit(&oid)?
            .parent()
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::RevisionNotFound(format!("parent of {oid}")))
    }

    fn resolve_oid(prefix: &str, database: &Database) -> Result<ObjectId> {
        let commits = database
            .find_objects_by_prefix(&prefix.to_ascii_lowercase())?
            .into_iter()
            .filter(|oid| matches!(database.object_type(oid), Ok(ObjectType::Commit)))
            .collect::<Vec<_>>();

        match commits.as_slice() {
            [] => Err(Error::RevisionNotFound(prefix.to_string())),
            [oid] => Ok(oid.clone()),
            candidates => {
                let candidates = candidates
                    .iter()
                    .map(ObjectId::to_short_oid)
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(Error::rejected(format!(
                    "short id {prefix} is ambiguous; candidates are {candidates}"
                )))
            }
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}
