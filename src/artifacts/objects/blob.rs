//! Blob object
//!
//! Blobs hold raw file content and nothing else; names and permissions live
//! in the trees that reference them.
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    data: Bytes,
    /// Mode of the working-copy file the blob was read from
    mode: FileMode,
}

impl Blob {
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Content as text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl Packable for Blob {
    fn serialize(&self) -> Result<Bytes> {
        Ok(frame(ObjectType::Blob, &self.data))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        // the header has already been read
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        Ok(Self::new(Bytes::from(data), FileMode::default()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}
