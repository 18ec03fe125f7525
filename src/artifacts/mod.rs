//! Data structures and algorithms
//!
//! - `branch`: branch names and revision parsing
//! - `checkout`: working-copy migrations between snapshots
//! - `core`: shared utilities (atomic writes, pager wrapper)
//! - `database`: database entry types
//! - `diff`: Myers line diff, hunks, tree comparison and patches
//! - `ignore`: `.surgeignore` rules
//! - `index`: index entry encoding
//! - `log`: commit history traversal
//! - `merge`: common ancestors, three-way merge and conflict markers
//! - `objects`: blob, tree and commit objects
//! - `remote`: object exchange with other repositories
//! - `status`: working-copy inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod database;
pub mod diff;
pub mod ignore;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod remote;
pub mod status;
