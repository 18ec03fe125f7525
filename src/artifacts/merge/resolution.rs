//! File-level merge of two snapshots against their merge base
//!
//! A path that only one side touched takes that side's version. A path both
//! sides changed to the same content is already merged. When both sides
//! changed a file differently its text goes through [`three_way_diff`]; a
//! delete on one side against an edit on the other is always a conflict.

use crate::areas::database::{Database, FileMap};
use crate::artifacts::diff::tree_diff::compare_file_maps;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::merge::conflict::ConflictLabels;
use crate::artifacts::merge::three_way::{MergeResult, three_way_diff};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::debug;

type Side = Option<(ObjectId, FileMode)>;

/// A path whose merged content still needs a human
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    /// Marker text to leave in the working copy
    pub text: String,
    pub mode: FileMode,
}

/// Everything that must change on top of our snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Clean results; `None` deletes the path
    pub updates: BTreeMap<PathBuf, Side>,
    pub conflicts: BTreeMap<PathBuf, ConflictedFile>,
}

impl MergePlan {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn conflicted_paths(&self) -> Vec<PathBuf> {
        self.conflicts.keys().cloned().collect()
    }

    /// Our snapshot with the clean updates applied
    pub fn apply_to(&self, ours: &FileMap) -> FileMap {
        let mut merged = ours.clone();
        for (path, side) in &self.updates {
            match side {
                Some(entry) => {
                    merged.insert(path.clone(), entry.clone());
                }
                None => {
                    merged.remove(path);
                }
            }
        }

        merged
    }
}

#[derive(Debug)]
pub struct SnapshotMerge<'r> {
    database: &'r Database,
    labels: ConflictLabels,
    auto_resolve: bool,
}

impl<'r> SnapshotMerge<'r> {
    pub fn new(database: &'r Database, labels: ConflictLabels, auto_resolve: bool) -> Self {
        SnapshotMerge {
            database,
            labels,
            auto_resolve,
        }
    }

    pub fn plan(&self, base: &FileMap, ours: &FileMap, theirs: &FileMap) -> Result<MergePlan> {
        let touched = compare_file_maps(base, ours)
            .into_keys()
            .chain(compare_file_maps(base, theirs).into_keys())
            .collect::<BTreeSet<_>>();

        let mut plan = MergePlan::default();
        for path in touched {
            let base_side = base.get(&path).cloned();
            let our_side = ours.get(&path).cloned();
            let their_side = theirs.get(&path).cloned();

            if our_side == their_side || their_side == base_side {
                continue;
            }
            if our_side == base_side {
                plan.updates.insert(path, their_side);
                continue;
            }

            self.merge_path(&mut plan, path, base_side, our_side, their_side)?;
        }

        debug!(
            updates = plan.updates.len(),
            conflicts = plan.conflicts.len(),
            "planned snapshot merge"
        );
        Ok(plan)
    }

    fn merge_path(&self, plan: &mut MergePlan, path: PathBuf, base: Side, ours: Side, theirs: Side) -> Result<()> {
        let mode = Self::merged_mode(&base, &ours, &theirs);
        let base_text = self.text_of(&base)?;
        let our_text = self.text_of(&ours)?;
        let their_text = self.text_of(&theirs)?;

        // modify/delete cannot be settled line by line
        let result = if ours.is_none() || theirs.is_none() {
            MergeResult::Conflict {
                ours: our_text,
                theirs: their_text,
            }
        } else {
            three_way_diff(&base_text, &our_text, &their_text, self.auto_resolve)
        };

        match result {
            MergeResult::Clean(text) => {
                let oid = self.database.put(text.as_bytes())?;
                plan.updates.insert(path, Some((oid, mode)));
            }
            conflict => {
                debug!(path = %path.display(), "content conflict");
                let text = conflict.into_text(&self.labels);
                plan.conflicts.insert(path, ConflictedFile { text, mode });
            }
        }

        Ok(())
    }

    fn text_of(&self, side: &Side) -> Result<String> {
        match side {
            Some((oid, _)) => Ok(String::from_utf8_lossy(&self.database.get(oid)?).into_owned()),
            None => Ok(String::new()),
        }
    }

    // a mode change on one side wins over an untouched mode on the other
    fn merged_mode(base: &Side, ours: &Side, theirs: &Side) -> FileMode {
        let mode_of = |side: &Side| side.as_ref().map(|(_, mode)| *mode);

        match (mode_of(base), mode_of(ours), mode_of(theirs)) {
            (base, Some(ours), Some(theirs)) if base == Some(ours) => theirs,
            (_, Some(ours), _) => ours,
            (_, None, Some(theirs)) => theirs,
            _ => FileMode::Regular,
        }
    }
}
