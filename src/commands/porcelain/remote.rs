use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::log::rev_list::DagWalk;
use crate::artifacts::merge::common_ancestor::{CommonAncestorFinder, ParentTraversal};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::remote::{RemoteTransport, collect_objects, ingest_objects};
use crate::errors::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use tracing::{debug, info};

impl Repository {
    /// Send a local branch to a remote and move the remote branch to it
    ///
    /// Only fast-forwards are accepted: the remote tip must already be part of
    /// the local history. `None` pushes the checked-out branch.
    pub async fn push(&self, transport: &dyn RemoteTransport, branch: Option<&str>) -> Result<ObjectId> {
        let _guard = self.lock().await?;

        let branch = match branch {
            Some(branch) => BranchName::try_parse(branch)?,
            None => self
                .refs()
                .current_branch()?
                .ok_or_else(|| Error::rejected("HEAD is detached; name the branch to push"))?,
        };
        let local_tip = self
            .refs()
            .read_branch(&branch)?
            .ok_or_else(|| Error::rejected(format!("branch {branch} has no commits to push")))?;

        let remote_tip = transport.resolve_remote_ref(&branch)?;
        if remote_tip.as_ref() == Some(&local_tip) {
            debug!(remote = transport.name(), %branch, "remote already up to date");
            self.refs().update_remote_ref(transport.name(), &branch, &local_tip)?;
            return Ok(local_tip);
        }

        let mut have = HashSet::new();
        if let Some(remote_tip) = &remote_tip {
            if !self.is_fast_forward(remote_tip, &local_tip)? {
                return Err(Error::rejected(format!(
                    "push of {branch} rejected: remote has commits missing locally; fetch and merge first"
                )));
            }
            for commit in DagWalk::new(self.database(), Some(remote_tip.clone())) {
                let (oid, _) = commit?;
                have.insert(oid);
            }
        }

        let objects = collect_objects(self.database(), &local_tip, &|oid| have.contains(oid))?;
        let sent = objects.len();
        transport.push_objects(objects, &branch, remote_tip.as_ref(), &local_tip)?;
        self.refs().update_remote_ref(transport.name(), &branch, &local_tip)?;

        info!(remote = transport.name(), %branch, oid = %local_tip, sent, "pushed");
        Ok(local_tip)
    }

    /// Copy a remote branch's history into the local store and record it
    /// under `refs/remotes/<remote>/<branch>`
    pub async fn fetch(&self, transport: &dyn RemoteTransport, branch: &str) -> Result<ObjectId> {
        let branch = BranchName::try_parse(branch)?;

        let _guard = self.lock().await?;

        let remote_tip = transport
            .resolve_remote_ref(&branch)?
            .ok_or_else(|| Error::BranchNotFound(format!("{}/{branch}", transport.name())))?;

        let database = self.database();
        let lookup_error = RefCell::new(None);
        let objects = transport.fetch_objects(&remote_tip, &|oid| match database.contains(oid) {
            Ok(present) => present,
            Err(error) => {
                let mut first = lookup_error.borrow_mut();
                if first.is_none() {
                    *first = Some(error);
                }
                false
            }
        })?;
        if let Some(error) = lookup_error.into_inner() {
            return Err(error);
        }
        let stored = ingest_objects(database, &objects)?;
        self.refs().update_remote_ref(transport.name(), &branch, &remote_tip)?;

        info!(remote = transport.name(), %branch, oid = %remote_tip, stored, "fetched");
        Ok(remote_tip)
    }

    fn is_fast_forward(&self, remote_tip: &ObjectId, local_tip: &ObjectId) -> Result<bool> {
        if !self.database().contains(remote_tip)? {
            return Ok(false);
        }

        let database = self.database();
        CommonAncestorFinder::new(|oid: &ObjectId| database.slim_commit(oid), ParentTraversal::AllParents)
            .is_ancestor(remote_tip, local_tip)
    }
}
