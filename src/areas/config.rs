//! Repository configuration
//!
//! Settings start from built-in defaults and are overridden by environment
//! variables:
//!
//! | variable               | meaning                                     | default |
//! |------------------------|---------------------------------------------|---------|
//! | `SURGE_AUTHOR_NAME`    | author and committer name                   |         |
//! | `SURGE_AUTHOR_EMAIL`   | author and committer email                  |         |
//! | `SURGE_AUTHOR_DATE`    | fixed signature date (RFC 2822 or ISO-like) | now     |
//! | `SURGE_LOCK_RETRIES`   | lock attempts after the first one           | 10      |
//! | `SURGE_LOCK_WAIT_MS`   | pause between lock attempts                 | 100     |
//! | `SURGE_DEFAULT_BRANCH` | branch HEAD points to after `init`          | main    |

use crate::areas::lock::LockPolicy;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Author;
use crate::errors::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

pub const AUTHOR_NAME_VAR: &str = "SURGE_AUTHOR_NAME";
pub const AUTHOR_EMAIL_VAR: &str = "SURGE_AUTHOR_EMAIL";
pub const AUTHOR_DATE_VAR: &str = "SURGE_AUTHOR_DATE";
pub const LOCK_RETRIES_VAR: &str = "SURGE_LOCK_RETRIES";
pub const LOCK_WAIT_MS_VAR: &str = "SURGE_LOCK_WAIT_MS";
pub const DEFAULT_BRANCH_VAR: &str = "SURGE_DEFAULT_BRANCH";

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    author_name: Option<String>,
    author_email: Option<String>,
    author_date: Option<DateTime<FixedOffset>>,
    lock_policy: LockPolicy,
    default_branch: BranchName,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            author_name: None,
            author_email: None,
            author_date: None,
            lock_policy: LockPolicy::default(),
            default_branch: BranchName::default_branch(),
        }
    }
}

impl RepositoryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults for absent keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.author_name = lookup(AUTHOR_NAME_VAR).filter(|name| !name.trim().is_empty());
        config.author_email = lookup(AUTHOR_EMAIL_VAR).filter(|email| !email.trim().is_empty());

        if let Some(date) = lookup(AUTHOR_DATE_VAR) {
            let date = Author::parse_date(&date).ok_or_else(|| {
                Error::rejected(format!("{AUTHOR_DATE_VAR} has an unrecognised date {date:?}"))
            })?;
            config.author_date = Some(date);
        }

        if let Some(retries) = lookup(LOCK_RETRIES_VAR) {
            config.lock_policy.retries = retries.trim().parse::<u32>().map_err(|_| {
                Error::rejected(format!("{LOCK_RETRIES_VAR} must be a non-negative integer, got {retries:?}"))
            })?;
        }

        if let Some(wait) = lookup(LOCK_WAIT_MS_VAR) {
            let millis = wait.trim().parse::<u64>().map_err(|_| {
                Error::rejected(format!("{LOCK_WAIT_MS_VAR} must be a number of milliseconds, got {wait:?}"))
            })?;
            config.lock_policy.wait = Duration::from_millis(millis);
        }

        if let Some(branch) = lookup(DEFAULT_BRANCH_VAR) {
            config.default_branch = BranchName::try_parse(branch)?;
        }

        Ok(config)
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self.author_email = Some(email.into());
        self
    }

    pub fn with_author_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.author_date = Some(date);
        self
    }

    pub fn with_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    pub fn with_default_branch(mut self, branch: BranchName) -> Self {
        self.default_branch = branch;
        self
    }

    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    pub fn default_branch(&self) -> &BranchName {
        &self.default_branch
    }

    /// Signature for new commits, stamped now unless a fixed date is configured
    pub fn author(&self) -> Result<Author> {
        let name = self
            .author_name
            .clone()
            .ok_or_else(|| Error::rejected(format!("{AUTHOR_NAME_VAR} is not set")))?;
        let email = self
            .author_email
            .clone()
            .ok_or_else(|| Error::rejected(format!("{AUTHOR_EMAIL_VAR} is not set")))?;

        Ok(match self.author_date {
            Some(date) => Author::new_with_timestamp(name, email, date),
            None => Author::new(name, email),
        })
    }
}
