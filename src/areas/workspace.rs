use crate::areas::database::Database;
use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::core::REPOSITORY_DIR;
use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::tree::validate_relative_path;
use crate::errors::{Error, IoContext, Result};
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Repository-relative form of a user-supplied path (relative to the root, or absolute inside it)
    pub fn relativize(&self, path: &Path) -> Result<PathBuf> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.path)
                .map(Path::to_path_buf)
                .map_err(|_| Error::rejected(format!("{} is outside the repository", path.display())))?
        } else {
            path.components()
                .filter(|component| !matches!(component, std::path::Component::CurDir))
                .collect()
        };

        if relative.as_os_str().is_empty() {
            return Ok(relative);
        }
        validate_relative_path(&relative)?;

        Ok(relative)
    }

    /// Every file in the working copy that the ignore rules let through, sorted
    pub fn list_files(&self, ignore: &dyn IgnorePredicate) -> Result<Vec<PathBuf>> {
        self.list_files_under(Path::new(""), ignore)
    }

    /// Files at or below a repository-relative path; an empty path is the whole working copy
    pub fn list_files_under(&self, relative: &Path, ignore: &dyn IgnorePredicate) -> Result<Vec<PathBuf>> {
        let root = self.path.join(relative);
        if !root.exists() {
            return Err(Error::PathNotFound(relative.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != REPOSITORY_DIR);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(path) = entry.path().strip_prefix(&self.path) else {
                continue;
            };
            if path.to_str().is_none() || ignore.is_ignored(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    pub fn exists(&self, relative: &Path) -> bool {
        self.path.join(relative).is_file()
    }

    pub fn read_file(&self, relative: &Path) -> Result<Bytes> {
        let path = self.path.join(relative);

        match std::fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::PathNotFound(relative.to_path_buf()))
            }
            Err(source) => Err(Error::Io {
                context: format!("unable to read {}", path.display()),
                source,
            }),
        }
    }

    pub fn file_mode(&self, relative: &Path) -> FileMode {
        FileMode::of(&self.path.join(relative))
    }

    /// Write a file, clearing whatever file or directory stands in the way
    pub fn write_file(&self, relative: &Path, data: &[u8], mode: FileMode) -> Result<()> {
        let path = self.path.join(relative);

        if path.is_dir() {
            std::fs::remove_dir_all(&path)
                .io_context(|| format!("unable to remove directory {}", path.display()))?;
        }
        if let Some(parent) = relative.parent() {
            self.make_directory(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .io_context(|| format!("unable to open {}", path.display()))?;
        file.write_all(data)
            .io_context(|| format!("unable to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.permissions());
            std::fs::set_permissions(&path, permissions)
                .io_context(|| format!("unable to set permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    /// Delete a file and any directories left empty by it; a missing file is fine
    pub fn remove_file(&self, relative: &Path) -> Result<()> {
        let path = self.path.join(relative);

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(Error::Io {
                    context: format!("unable to remove {}", path.display()),
                    source,
                });
            }
        }

        let mut parent = relative.parent();
        while let Some(dir) = parent.filter(|dir| !dir.as_os_str().is_empty()) {
            let dir_path = self.path.join(dir);
            let is_empty = std::fs::read_dir(&dir_path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                break;
            }

            std::fs::remove_dir(&dir_path)
                .io_context(|| format!("unable to remove directory {}", dir_path.display()))?;
            parent = dir.parent();
        }

        Ok(())
    }

    // ancestors first, replacing files that occupy a directory's place
    fn make_directory(&self, relative: &Path) -> Result<()> {
        let mut current = self.path.to_path_buf();

        for component in relative.components() {
            current.push(component);
            if current.is_file() {
                std::fs::remove_file(&current)
                    .io_context(|| format!("unable to remove {}", current.display()))?;
            }
            if !current.exists() {
                std::fs::create_dir(&current)
                    .io_context(|| format!("unable to create directory {}", current.display()))?;
            }
        }

        Ok(())
    }

    /// Deletions first, so files can take the place of removed directories and vice versa
    pub fn apply_migration(&self, migration: &Migration, database: &Database) -> Result<()> {
        for (path, _) in migration.actions_of(ActionType::Delete) {
            self.remove_file(path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (path, planned) in migration.actions_of(action) {
                let Some((oid, mode)) = &planned.target else {
                    continue;
                };

                let data = database.parse_object_as_blob(oid)?.into_data();
                self.write_file(path, &data, *mode)?;
            }
        }

        Ok(())
    }
}
