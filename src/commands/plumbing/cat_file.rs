use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};

impl Repository {
    /// Parse the object named by a full or abbreviated id, or by a revision
    pub fn cat_file(&self, name: &str) -> Result<(ObjectId, ObjectBox)> {
        let oid = if ObjectId::looks_like_prefix(name) {
            let mut candidates = self.database().find_objects_by_prefix(name)?;
            match candidates.len() {
                0 => return Err(Error::RevisionNotFound(name.to_string())),
                1 => candidates.remove(0),
                count => return Err(Error::rejected(format!("{name} is ambiguous: {count} objects match"))),
            }
        } else {
            self.resolve_commit(name)?
        };

        let object = self.database().parse_object(&oid)?;
        Ok((oid, object))
    }
}
