use crate::areas::repository::Repository;
use crate::artifacts::objects::object::frame;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use std::path::Path;

impl Repository {
    /// Blob id of a working-copy file, storing the blob when `write` is set
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<ObjectId> {
        let relative = self.workspace().relativize(path)?;
        let data = self.workspace().read_file(&relative)?;

        if write {
            self.database().put(&data)
        } else {
            Ok(ObjectId::hash_record(&frame(ObjectType::Blob, &data)))
        }
    }
}
