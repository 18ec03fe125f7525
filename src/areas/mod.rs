//! Repository components
//!
//! - `backend`: storage engines behind the object database
//! - `config`: settings read from the environment
//! - `database`: content-addressed store for blobs, trees and commits
//! - `index`: staging area between the working copy and the next commit
//! - `lock`: the advisory lock guarding refs and the index
//! - `refs`: HEAD, branches, MERGE_HEAD and remote-tracking refs
//! - `repository`: the handle tying everything together
//! - `workspace`: working-copy file system access

pub mod backend;
pub mod config;
pub mod database;
pub mod index;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod workspace;
