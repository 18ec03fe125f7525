//! Staging index file format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "SIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, see `index_entry`)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! All integers are big-endian.

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// 4 bytes for the signature, 4 for the version, 4 for the entry count
pub const HEADER_SIZE: usize = 12;

pub const SIGNATURE: &str = "SIDX";

pub const VERSION: u32 = 1;
