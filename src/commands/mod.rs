//! Repository operations
//!
//! - `plumbing`: low-level object access (hash-object, cat-file)
//! - `porcelain`: user-facing workflows (add, commit, merge, log, ...)

pub mod plumbing;
pub mod porcelain;
