//! Switching the working copy from one snapshot to another
//!
//! The plan is computed first; the repository checks it against local
//! changes before the workspace applies it.

pub mod migration;
