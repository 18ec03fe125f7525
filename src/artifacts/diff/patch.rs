use crate::areas::database::Database;
use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, MyersDiff, split_lines};
use crate::artifacts::diff::hunk::{HUNK_CONTEXT, Hunk};
use crate::artifacts::diff::tree_diff::TreeChangeType;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::fmt::Write;
use std::path::PathBuf;

/// One changed path and, for text content, the hunks that turn the old side into the new
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub path: PathBuf,
    pub change: TreeChangeType,
    /// `None` when either side is not valid utf-8 text
    pub hunks: Option<Vec<Hunk<String>>>,
}

impl FilePatch {
    pub fn build(path: PathBuf, change: TreeChangeType, database: &Database) -> Result<Self> {
        let old = Self::text_of(change.old_entry().map(|entry| &entry.oid), database)?;
        let new = Self::text_of(change.new_entry().map(|entry| &entry.oid), database)?;

        let hunks = match (old, new) {
            (Some(old), Some(new)) => {
                let a = split_lines(&old).into_iter().map(str::to_string).collect::<Vec<_>>();
                let b = split_lines(&new).into_iter().map(str::to_string).collect::<Vec<_>>();
                Some(Hunk::build(&MyersDiff::new(&a, &b).diff(), HUNK_CONTEXT))
            }
            _ => None,
        };

        Ok(FilePatch { path, change, hunks })
    }

    // a missing side reads as empty text
    fn text_of(oid: Option<&ObjectId>, database: &Database) -> Result<Option<String>> {
        let Some(oid) = oid else {
            return Ok(Some(String::new()));
        };

        let data = database.get(oid)?;
        if data.contains(&0) {
            return Ok(None);
        }

        Ok(String::from_utf8(data.to_vec()).ok())
    }

    /// Plain unified rendering, without color
    pub fn render(&self) -> String {
        let mut out = String::new();
        let path = self.path.display();

        let (old_label, new_label) = match &self.change {
            TreeChangeType::Added(_) => ("/dev/null".to_string(), format!("b/{path}")),
            TreeChangeType::Deleted(_) => (format!("a/{path}"), "/dev/null".to_string()),
            TreeChangeType::Modified { .. } => (format!("a/{path}"), format!("b/{path}")),
        };

        let _ = writeln!(out, "diff --surge a/{path} b/{path}");
        match &self.change {
            TreeChangeType::Added(entry) => {
                let _ = writeln!(out, "new file mode {}", entry.mode_str());
            }
            TreeChangeType::Deleted(entry) => {
                let _ = writeln!(out, "deleted file mode {}", entry.mode_str());
            }
            TreeChangeType::Modified { old, new } if old.mode != new.mode => {
                let _ = writeln!(out, "old mode {}", old.mode_str());
                let _ = writeln!(out, "new mode {}", new.mode_str());
            }
            TreeChangeType::Modified { .. } => {}
        }

        let Some(hunks) = &self.hunks else {
            let _ = writeln!(out, "Binary files {old_label} and {new_label} differ");
            return out;
        };
        if hunks.is_empty() {
            return out;
        }

        let _ = writeln!(out, "--- {old_label}");
        let _ = writeln!(out, "+++ {new_label}");
        for hunk in hunks {
            let _ = writeln!(out, "{}", hunk.header());
            for edit in hunk.edits() {
                let _ = write!(out, "{edit}");
                if !edit.value().ends_with('\n') {
                    out.push_str("\n\\ No newline at end of file\n");
                }
            }
        }

        out
    }
}
