use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// A file as recorded in a stored tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    pub oid: ObjectId,
    pub mode: FileMode,
}

impl DatabaseEntry {
    pub fn mode_str(&self) -> &'static str {
        EntryMode::File(self.mode).as_str()
    }
}

impl From<(ObjectId, FileMode)> for DatabaseEntry {
    fn from((oid, mode): (ObjectId, FileMode)) -> Self {
        DatabaseEntry { oid, mode }
    }
}
