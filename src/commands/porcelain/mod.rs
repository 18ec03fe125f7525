//! Porcelain commands
//!
//! The operations a user works with day to day. Each one is an
//! `impl Repository` block; the ones that mutate refs or the index take the
//! repository lock for their whole duration.
//!
//! - `init`: create a repository
//! - `add` / `rm`: stage and unstage files
//! - `commit`: record the staged snapshot
//! - `status`: compare HEAD, the index and the working copy
//! - `diff`: patches between two revisions
//! - `log`: commit history
//! - `branch`: create, delete and list branches
//! - `checkout`: switch branches or detach HEAD
//! - `merge`: three-way merge of another branch
//! - `reset`: move the current ref, optionally resetting index and working copy
//! - `remote`: push to and fetch from other repositories

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod remote;
pub mod reset;
pub mod rm;
pub mod status;
