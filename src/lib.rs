//! surge: a content-addressed version-control engine
//!
//! - `areas`: the on-disk parts of a repository and the [`Repository`] handle
//! - `artifacts`: data structures and algorithms (objects, diff, merge, status, ...)
//! - `commands`: repository operations, split into plumbing and porcelain
//! - `errors`: the typed error taxonomy shared by all of the above
//!
//! [`Repository`]: areas::repository::Repository

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
