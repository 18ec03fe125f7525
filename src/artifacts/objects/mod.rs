//! Content-addressed object types
//!
//! Everything the repository stores is one of three immutable objects, each
//! identified by the SHA-1 of its framed record `<type> <size>\0<payload>`:
//!
//! - **Blob**: raw file content
//! - **Tree**: a sorted directory listing of names, modes and object ids
//! - **Commit**: a tree snapshot plus parents, author, committer and message
//!
//! Identical content always frames to identical bytes, so storing the same
//! payload twice yields the same id and a single stored copy.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest prefix accepted when resolving abbreviated object ids
pub const MIN_ABBREV_LENGTH: usize = 4;

/// Id of the tree with no entries
pub const EMPTY_TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
