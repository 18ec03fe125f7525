#![allow(dead_code)]

use assert_fs::TempDir;
use chrono::{DateTime, FixedOffset, TimeZone};
use fake::Fake;
use fake::faker::lorem::en::Words;
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use surge::areas::config::RepositoryConfig;
use surge::areas::lock::LockPolicy;
use surge::areas::repository::Repository;
use surge::artifacts::objects::commit::Author;
use surge::artifacts::objects::object_id::ObjectId;

pub const AUTHOR_NAME: &str = "Alice Liddell";
pub const AUTHOR_EMAIL: &str = "alice@example.com";
pub const AUTHOR_DATE: &str = "2024-05-01 12:00:00 +0000";

/// A throw-away repository; the directory lives as long as the sandbox
pub struct Sandbox {
    pub dir: TempDir,
    pub repository: Repository,
}

impl Sandbox {
    pub fn path(&self) -> &Path {
        self.repository.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        write_file(self.path(), relative, content)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).expect("failed to read working-copy file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }

    /// Stage everything and commit with a signature `seconds` after the base date
    pub async fn commit_all(&self, message: &str, seconds: i64) -> ObjectId {
        self.repository.add_files(&["."]).await.expect("add failed");
        self.repository
            .commit(message, author_at(seconds))
            .await
            .expect("commit failed")
    }

    pub fn head(&self) -> ObjectId {
        self.repository
            .resolve_commit("HEAD")
            .expect("HEAD does not resolve")
    }

    /// Number of loose object files in the store
    pub fn object_count(&self) -> usize {
        walkdir_files(&self.repository.surge_path().join("objects"))
    }
}

fn walkdir_files(root: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() { walkdir_files(&path) } else { 1 }
        })
        .sum()
}

pub fn base_date() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .and_then(|offset| offset.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single())
        .expect("valid base date")
}

pub fn author_at(seconds: i64) -> Author {
    Author::new_with_timestamp(
        AUTHOR_NAME.to_string(),
        AUTHOR_EMAIL.to_string(),
        base_date() + chrono::Duration::seconds(seconds),
    )
}

pub fn test_config() -> RepositoryConfig {
    RepositoryConfig::default()
        .with_author(AUTHOR_NAME, AUTHOR_EMAIL)
        .with_author_date(base_date())
        .with_lock_policy(LockPolicy {
            retries: 2,
            wait: Duration::from_millis(10),
        })
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    std::fs::write(&path, content).expect("failed to write file");

    path
}

pub fn random_content() -> String {
    let mut words = Words(5..10).fake::<Vec<String>>().join(" ");
    words.push('\n');
    words
}

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

#[fixture]
pub fn sandbox(repository_dir: TempDir) -> Sandbox {
    let repository = Repository::init(repository_dir.path(), test_config()).expect("init failed");

    Sandbox {
        dir: repository_dir,
        repository,
    }
}

/// The `surge` binary, configured with a fixed author
pub fn surge_command(dir: &Path) -> assert_cmd::Command {
    let mut command = assert_cmd::Command::cargo_bin("surge").expect("binary not built");
    command
        .current_dir(dir)
        .env("SURGE_AUTHOR_NAME", AUTHOR_NAME)
        .env("SURGE_AUTHOR_EMAIL", AUTHOR_EMAIL)
        .env("SURGE_AUTHOR_DATE", AUTHOR_DATE)
        .env_remove("SURGE_DEFAULT_BRANCH")
        .env("NO_COLOR", "1")
        .env_remove("SURGE_LOG");

    command
}
