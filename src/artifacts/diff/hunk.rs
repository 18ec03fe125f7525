//! Grouping an edit script into unified-diff hunks

use crate::artifacts::diff::diff_algorithm::Edit;

/// Unchanged lines shown around each change
pub const HUNK_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<T> {
    /// 1-based first line on the old side (0 when the side is empty)
    a_start: usize,
    a_size: usize,
    b_start: usize,
    b_size: usize,
    edits: Vec<Edit<T>>,
}

impl<T: Clone> Hunk<T> {
    /// Split `edits` into hunks keeping `context` equal lines around changes;
    /// changes closer than twice the context share a hunk
    pub fn build(edits: &[Edit<T>], context: usize) -> Vec<Hunk<T>> {
        // (old line, new line) before each edit, 0-based
        let mut positions = Vec::with_capacity(edits.len());
        let (mut a_line, mut b_line) = (0, 0);
        for edit in edits {
            positions.push((a_line, b_line));
            match edit {
                Edit::Delete { .. } => a_line += 1,
                Edit::Insert { .. } => b_line += 1,
                Edit::Equal { .. } => {
                    a_line += 1;
                    b_line += 1;
                }
            }
        }

        let changes = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| !edit.is_equal())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for index in changes {
            let start = index.saturating_sub(context);
            let end = (index + context + 1).min(edits.len());

            match ranges.last_mut() {
                Some((_, last_end)) if start <= *last_end => *last_end = end,
                _ => ranges.push((start, end)),
            }
        }

        ranges
            .into_iter()
            .map(|(start, end)| {
                let edits = edits[start..end].to_vec();
                let a_size = edits.iter().filter(|edit| !matches!(edit, Edit::Insert { .. })).count();
                let b_size = edits.iter().filter(|edit| !matches!(edit, Edit::Delete { .. })).count();
                let (a_line, b_line) = positions[start];

                Hunk {
                    a_start: if a_size == 0 { a_line } else { a_line + 1 },
                    a_size,
                    b_start: if b_size == 0 { b_line } else { b_line + 1 },
                    b_size,
                    edits,
                }
            })
            .collect()
    }
}

impl<T> Hunk<T> {
    pub fn a_start(&self) -> usize {
        self.a_start
    }

    pub fn a_size(&self) -> usize {
        self.a_size
    }

    pub fn b_start(&self) -> usize {
        self.b_start
    }

    pub fn b_size(&self) -> usize {
        self.b_size
    }

    pub fn edits(&self) -> &[Edit<T>] {
        &self.edits
    }

    /// `@@ -a_start,a_size +b_start,b_size @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.a_start, self.a_size, self.b_start, self.b_size
        )
    }
}
