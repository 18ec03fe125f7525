//! Repository error taxonomy
//!
//! Every fallible library operation returns [`Result`]. Callers branch on
//! [`Error::kind`] rather than on message text.

use crate::artifacts::objects::object_id::ObjectId;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A missing object, commit, branch, revision or path
    NotFound,
    /// Nothing staged for the next commit
    EmptyCommit,
    /// The two histories share no commit
    NoCommonAncestor,
    /// A merge stopped on conflicts that must be fixed by hand
    ManualResolutionRequired,
    /// The repository lock stayed contended for the whole retry budget
    LockTimeout,
    /// A stored payload could not be decoded
    Corrupt,
    /// The operation is not allowed in the current state or with these arguments
    Rejected,
    /// Underlying file system failure
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("branch {0} not found")]
    BranchNotFound(String),

    #[error("revision {0} could not be resolved")]
    RevisionNotFound(String),

    #[error("path {} did not match any file", .0.display())]
    PathNotFound(PathBuf),

    #[error("nothing to commit")]
    EmptyCommit,

    #[error("no common ancestor between {ours} and {theirs}")]
    NoCommonAncestor { ours: ObjectId, theirs: ObjectId },

    #[error("automatic merge failed; fix conflicts in {} and commit the result", DisplayPaths(.paths))]
    ManualResolutionRequired { paths: Vec<PathBuf> },

    #[error("unable to acquire {} after {attempts} attempts", .path.display())]
    LockTimeout { path: PathBuf, attempts: u32 },

    #[error("corrupt {location}: {reason}")]
    Corrupt { location: String, reason: String },

    #[error("{0}")]
    Rejected(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound(_)
            | Error::BranchNotFound(_)
            | Error::RevisionNotFound(_)
            | Error::PathNotFound(_) => ErrorKind::NotFound,
            Error::EmptyCommit => ErrorKind::EmptyCommit,
            Error::NoCommonAncestor { .. } => ErrorKind::NoCommonAncestor,
            Error::ManualResolutionRequired { .. } => ErrorKind::ManualResolutionRequired,
            Error::LockTimeout { .. } => ErrorKind::LockTimeout,
            Error::Corrupt { .. } => ErrorKind::Corrupt,
            Error::Rejected(_) => ErrorKind::Rejected,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn corrupt_object(oid: &ObjectId, reason: impl fmt::Display) -> Self {
        Error::Corrupt {
            location: format!("object {oid}"),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt_file(path: &Path, reason: impl fmt::Display) -> Self {
        Error::Corrupt {
            location: format!("file {}", path.display()),
            reason: reason.to_string(),
        }
    }

    /// Payload-level decoding failure; the caller usually re-wraps it with the oid
    pub fn malformed(reason: impl fmt::Display) -> Self {
        Error::Corrupt {
            location: "payload".to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn rejected(reason: impl fmt::Display) -> Self {
        Error::Rejected(reason.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            context: "i/o error".to_string(),
            source,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        let context = match error.path() {
            Some(path) => format!("unable to walk {}", path.display()),
            None => "unable to walk directory".to_string(),
        };

        Error::Io {
            context,
            source: std::io::Error::other(error),
        }
    }
}

/// Attach a message to an I/O failure, in the spirit of `anyhow::Context`
pub trait IoContext<T> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::Io {
            context: context().into(),
            source,
        })
    }
}

struct DisplayPaths<'p>(&'p [PathBuf]);

impl fmt::Display for DisplayPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths = self
            .0
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", paths.join(", "))
    }
}
