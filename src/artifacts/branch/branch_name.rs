use crate::areas::config::DEFAULT_BRANCH;
use crate::artifacts::branch::{HEADS_PREFIX, INVALID_BRANCH_NAME_REGEX};
use crate::errors::{Error, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static INVALID_BRANCH_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(INVALID_BRANCH_NAME_REGEX).ok());

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::rejected("branch name cannot be empty"));
        }

        let invalid = INVALID_BRANCH_NAME
            .as_ref()
            .ok_or_else(|| Error::rejected("branch name pattern failed to compile"))?;
        if invalid.is_match(&name) {
            return Err(Error::rejected(format!("invalid branch name: {name}")));
        }

        Ok(Self(name))
    }

    /// Accept `feature` as well as `refs/heads/feature`
    pub fn try_parse_ref(name: &str) -> Result<Self> {
        Self::try_parse(name.strip_prefix(HEADS_PREFIX).unwrap_or(name))
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    /// `refs/heads/<name>`
    pub fn to_ref_path(&self) -> PathBuf {
        PathBuf::from(format!("{HEADS_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
