use crate::areas::config::RepositoryConfig;
use crate::areas::refs::Refs;
use crate::areas::repository::{OBJECTS_DIR, Repository};
use crate::artifacts::core::{REPOSITORY_DIR, write_atomically};
use crate::artifacts::ignore::{DEFAULT_IGNORE_PATTERNS, IGNORE_FILE_NAME};
use crate::errors::{Error, IoContext, Result};
use std::fs;
use std::path::Path;
use tracing::info;

impl Repository {
    /// Create `.surge` under `path` and open the new repository
    ///
    /// HEAD points at the configured default branch, which stays unborn until
    /// the first commit.
    pub fn init(path: &Path, config: RepositoryConfig) -> Result<Repository> {
        fs::create_dir_all(path).io_context(|| format!("unable to create {}", path.display()))?;

        let surge_path = path.join(REPOSITORY_DIR);
        if surge_path.exists() {
            return Err(Error::rejected(format!(
                "{} already holds a surge repository",
                path.display()
            )));
        }

        let objects_path = surge_path.join(OBJECTS_DIR);
        fs::create_dir_all(&objects_path)
            .io_context(|| format!("unable to create {}", objects_path.display()))?;

        let refs = Refs::new(surge_path.clone().into_boxed_path());
        fs::create_dir_all(refs.heads_path())
            .io_context(|| format!("unable to create {}", refs.heads_path().display()))?;

        let branch = config.default_branch();
        refs.write_branch(branch, None)?;
        refs.set_head_branch(branch)?;

        write_atomically(
            &surge_path.join(IGNORE_FILE_NAME),
            DEFAULT_IGNORE_PATTERNS.as_bytes(),
        )?;

        info!(path = %path.display(), %branch, "initialised repository");
        Repository::open(path, config)
    }
}
