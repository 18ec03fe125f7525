//! Working copy status
//!
//! - `file_change`: change categories and their rendering
//! - `inspector`: content and mode comparison of working-copy files
//! - `status_info`: the report comparing HEAD, the index and the working copy

pub mod file_change;
pub mod inspector;
pub mod status_info;
