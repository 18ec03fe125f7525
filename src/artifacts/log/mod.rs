//! Commit history traversal
//!
//! - `rev_list`: the first-parent chain behind a commit, and the full
//!   ancestry graph ordered newest first

pub mod rev_list;
