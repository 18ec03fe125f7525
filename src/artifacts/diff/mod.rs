//! Line and tree comparison
//!
//! - `diff_algorithm`: Myers' shortest edit script over any `Eq` sequence
//! - `hunk`: grouping of edits into unified-diff hunks
//! - `tree_diff`: which paths changed between two snapshots
//! - `patch`: per-file change plus its line hunks

pub mod diff_algorithm;
pub mod hunk;
pub mod patch;
pub mod tree_diff;
