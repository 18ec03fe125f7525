use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub marker: String,
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn empty() -> Self {
        IndexHeader::new(String::from(SIGNATURE), VERSION, 0)
    }

    pub fn with_count(entries_count: u32) -> Self {
        IndexHeader {
            entries_count,
            ..Self::empty()
        }
    }

    /// Reject foreign files and unknown versions
    pub fn validate(&self) -> Result<()> {
        if self.marker != SIGNATURE {
            return Err(Error::malformed(format!(
                "invalid index signature {:?}",
                self.marker
            )));
        }
        if self.version != VERSION {
            return Err(Error::malformed(format!(
                "unsupported index version {}",
                self.version
            )));
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(self.marker.as_bytes());
        bytes.write_u32::<NetworkEndian>(self.version)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut marker = [0u8; 4];
        reader
            .read_exact(&mut marker)
            .map_err(|_| Error::malformed("index header is truncated"))?;
        let marker = String::from_utf8(marker.to_vec())
            .map_err(|_| Error::malformed("invalid marker in index header"))?;

        let version = reader
            .read_u32::<NetworkEndian>()
            .map_err(|_| Error::malformed("index header is truncated"))?;
        let entries_count = reader
            .read_u32::<NetworkEndian>()
            .map_err(|_| Error::malformed("index header is truncated"))?;

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}
