//! Merge engine
//!
//! - `common_ancestor`: merge-base search over the commit graph
//! - `three_way`: line-level merge of a single file
//! - `conflict`: conflict marker text
//! - `resolution`: file-level merge of two snapshots against their base

pub mod common_ancestor;
pub mod conflict;
pub mod resolution;
pub mod three_way;
