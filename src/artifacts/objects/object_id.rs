//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character lowercase hexadecimal strings. On disk, loose
//! objects live under `objects/<first-2-chars>/<remaining-38-chars>`; inside
//! tree records the id is written as 20 raw bytes.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate a full 40-character hex id
    pub fn try_parse(id: String) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::malformed(format!(
                "invalid object id length {} for {id:?}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::malformed(format!(
                "invalid object id characters in {id:?}"
            )));
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Hash an already framed object record
    pub fn hash_record(record: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(record);

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Whether `candidate` could be an abbreviation of some object id
    pub fn looks_like_prefix(candidate: &str) -> bool {
        (super::MIN_ABBREV_LENGTH..=OBJECT_ID_LENGTH).contains(&candidate.len())
            && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Write the id as 20 raw bytes
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| Error::malformed(format!("invalid hex digit in {hex40}")))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an id from 20 raw bytes
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader
            .read_exact(&mut raw)
            .map_err(|_| Error::malformed("unexpected end of data in object id"))?;

        let hex40 = raw.iter().map(|byte| format!("{byte:02x}")).collect();
        Ok(Self(hex40))
    }

    /// Loose-object location relative to the objects directory: `ab/cdef...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
