//! Plumbing commands
//!
//! Direct access to the object store, mostly for scripting and debugging.
//!
//! - `hash-object`: compute a file's blob id and optionally store it
//! - `cat-file`: print a stored object

pub mod cat_file;
pub mod hash_object;
