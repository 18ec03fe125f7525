use crate::areas::refs::BranchRef;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use tracing::info;

impl Repository {
    /// Create a branch at `start`, or at HEAD when no start is given
    pub async fn create_branch(&self, name: &str, start: Option<&str>) -> Result<ObjectId> {
        let name = BranchName::try_parse(name)?;

        let _guard = self.lock().await?;

        let start_oid = match start {
            Some(start) => self.resolve_commit(start)?,
            None => self
                .refs()
                .read_head()?
                .ok_or_else(|| Error::rejected(format!("cannot create {name}: HEAD has no commits yet")))?,
        };
        // only commits can be branch tips
        self.database().parse_object_as_commit(&start_oid)?;

        self.refs().create_branch(&name, &start_oid)?;

        info!(branch = %name, oid = %start_oid, "branch created");
        Ok(start_oid)
    }

    /// Delete a branch other than the checked-out one, returning its former tip
    pub async fn delete_branch(&self, name: &str) -> Result<Option<ObjectId>> {
        let name = BranchName::try_parse(name)?;

        let _guard = self.lock().await?;

        if self.refs().is_current_branch(&name)? {
            return Err(Error::rejected(format!("cannot delete the checked-out branch {name}")));
        }
        let oid = self.refs().delete_branch(&name)?;

        info!(branch = %name, "branch deleted");
        Ok(oid)
    }

    /// Every local branch, sorted by name
    pub fn list_branches(&self) -> Result<Vec<BranchRef>> {
        self.refs().list_branches()
    }
}
