//! Line-level three-way merge of one file
//!
//! Each side is diffed against the ancestor and its edits are grouped into
//! changes over ancestor line ranges. Two changes from different sides
//! collide when their ranges overlap or touch; identical changes count once.

use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, Edit, MyersDiff, split_lines};
use crate::artifacts::merge::conflict::{ConflictLabels, create_conflict_markers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult {
    Clean(String),
    Conflict { ours: String, theirs: String },
}

impl MergeResult {
    pub fn is_conflict(&self) -> bool {
        matches!(self, MergeResult::Conflict { .. })
    }

    /// Merged text, or the conflict block when the sides could not be reconciled
    pub fn into_text(self, labels: &ConflictLabels) -> String {
        match self {
            MergeResult::Clean(text) => text,
            MergeResult::Conflict { ours, theirs } => create_conflict_markers(&ours, &theirs, labels),
        }
    }
}

/// Replace ancestor lines `start..end` with `lines`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Change<'t> {
    start: usize,
    end: usize,
    lines: Vec<&'t str>,
}

impl Change<'_> {
    fn collides_with(&self, other: &Change<'_>) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

fn changes<'t>(ancestor: &[&'t str], side: &[&'t str]) -> Vec<Change<'t>> {
    let mut changes = Vec::new();
    let mut current: Option<Change<'t>> = None;
    let mut line = 0;

    for edit in MyersDiff::new(ancestor, side).diff() {
        match edit {
            Edit::Equal { .. } => {
                changes.extend(current.take());
                line += 1;
            }
            Edit::Delete { .. } => {
                current.get_or_insert_with(|| Change { start: line, end: line, lines: Vec::new() }).end += 1;
                line += 1;
            }
            Edit::Insert { value } => {
                current
                    .get_or_insert_with(|| Change { start: line, end: line, lines: Vec::new() })
                    .lines
                    .push(value);
            }
        }
    }
    changes.extend(current);

    changes
}

/// Merge `ours` and `theirs`, both descended from `ancestor`
///
/// Only one side changing, or both sides arriving at the same text, merges
/// cleanly. Otherwise the result is a conflict unless `auto_resolve` is set and
/// the two sides touched separate regions of the ancestor.
pub fn three_way_diff(ancestor: &str, ours: &str, theirs: &str, auto_resolve: bool) -> MergeResult {
    if ours == theirs || theirs == ancestor {
        return MergeResult::Clean(ours.to_string());
    }
    if ours == ancestor {
        return MergeResult::Clean(theirs.to_string());
    }

    let conflict = || MergeResult::Conflict {
        ours: ours.to_string(),
        theirs: theirs.to_string(),
    };
    if !auto_resolve {
        return conflict();
    }

    let base = split_lines(ancestor);
    let our_changes = changes(&base, &split_lines(ours));
    let their_changes = changes(&base, &split_lines(theirs));

    let mut merged_changes = our_changes.clone();
    for theirs_change in their_changes {
        if our_changes.contains(&theirs_change) {
            continue;
        }
        if our_changes.iter().any(|change| change.collides_with(&theirs_change)) {
            return conflict();
        }
        merged_changes.push(theirs_change);
    }
    merged_changes.sort_by_key(|change| (change.start, change.end));

    let mut merged = String::with_capacity(ours.len().max(theirs.len()));
    let mut line = 0;
    for change in merged_changes {
        base[line..change.start].iter().for_each(|text| merged.push_str(text));
        change.lines.iter().for_each(|text| merged.push_str(text));
        line = change.end;
    }
    base[line..].iter().for_each(|text| merged.push_str(text));

    MergeResult::Clean(merged)
}
