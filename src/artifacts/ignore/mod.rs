//! Ignore rules
//!
//! `.surgeignore` is a newline-delimited pattern list:
//!
//! - blank lines and lines starting with `#` are skipped
//! - `dir/` ignores everything below a directory named `dir`
//! - `*` matches any run of characters, anchored at both ends of the path
//! - `!path` keeps exactly `path` tracked even when another pattern matches it;
//!   it does not re-include anything else
//! - any other line ignores the path equal to it
//!
//! The repository directory itself is always ignored.

use crate::artifacts::core::REPOSITORY_DIR;
use crate::errors::{Error, Result};
use regex::Regex;
use std::path::{Component, Path};

pub const IGNORE_FILE_NAME: &str = ".surgeignore";

pub const DEFAULT_IGNORE_PATTERNS: &str = "\
# Dependencies
node_modules/
target/

# Build outputs
dist/
build/
out/

# Environment files
.env
.env.local
.env.*.local

# IDE files
.idea/
.vscode/
*.swp
*.swo

# OS files
.DS_Store
Thumbs.db

# Logs
*.log

# Temporary files
*.tmp
*.bak
";

/// Decides whether a repository-relative path stays out of the index
pub trait IgnorePredicate: Send + Sync + std::fmt::Debug {
    fn is_ignored(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone)]
enum Pattern {
    Directory(String),
    Wildcard(Regex),
    Exact(String),
}

impl Pattern {
    fn parse(line: &str) -> Result<Self> {
        if let Some(directory) = line.strip_suffix('/') {
            return Ok(Pattern::Directory(directory.to_string()));
        }

        if line.contains('*') {
            let regex = line
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            let regex = Regex::new(&format!("^{regex}$"))
                .map_err(|error| Error::rejected(format!("invalid ignore pattern {line:?}: {error}")))?;
            return Ok(Pattern::Wildcard(regex));
        }

        Ok(Pattern::Exact(line.to_string()))
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Directory(directory) => {
                let under_prefix = path
                    .strip_prefix(directory.as_str())
                    .is_some_and(|rest| rest.starts_with('/'));
                let nested = !directory.contains('/')
                    && path
                        .rsplit_once('/')
                        .is_some_and(|(parents, _)| parents.split('/').any(|part| part == directory));

                under_prefix || nested
            }
            Pattern::Wildcard(regex) => regex.is_match(path),
            Pattern::Exact(exact) => path == exact,
        }
    }
}

/// Rules compiled from `.surgeignore` content
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
    kept: Vec<String>,
}

impl IgnoreRules {
    pub fn parse(content: &str) -> Result<Self> {
        let mut rules = IgnoreRules::default();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.strip_prefix('!') {
                Some(kept) => rules.kept.push(kept.to_string()),
                None => rules.patterns.push(Pattern::parse(line)?),
            }
        }

        tracing::debug!(patterns = rules.patterns.len(), kept = rules.kept.len(), "ignore rules loaded");
        Ok(rules)
    }

    /// Load rules from a file; a missing file means nothing is ignored
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(Error::Io {
                context: format!("unable to read {}", path.display()),
                source,
            }),
        }
    }
}

impl IgnorePredicate for IgnoreRules {
    fn is_ignored(&self, path: &Path) -> bool {
        if path.components().next() == Some(Component::Normal(REPOSITORY_DIR.as_ref())) {
            return true;
        }

        let Some(path) = path.to_str() else {
            return false;
        };
        if self.kept.iter().any(|kept| kept == path) {
            return false;
        }

        self.patterns.iter().any(|pattern| pattern.matches(path))
    }
}

/// Ignores nothing except the repository directory
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackEverything;

impl IgnorePredicate for TrackEverything {
    fn is_ignored(&self, path: &Path) -> bool {
        path.components().next() == Some(Component::Normal(REPOSITORY_DIR.as_ref()))
    }
}
