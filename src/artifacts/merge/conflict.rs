//! Conflict marker text
//!
//! ```text
//! <<<<<<< ours label
//! our lines
//! =======
//! their lines
//! >>>>>>> theirs label
//! ```
//!
//! A side that does not end in a newline gets one before the next marker, so
//! every marker always starts its own line.

use derive_new::new;

pub const OURS_MARKER: &str = "<<<<<<<";
pub const SEPARATOR: &str = "=======";
pub const THEIRS_MARKER: &str = ">>>>>>>";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ConflictLabels {
    pub ours: String,
    pub theirs: String,
}

impl Default for ConflictLabels {
    fn default() -> Self {
        ConflictLabels::new("HEAD".to_string(), "MERGE_HEAD".to_string())
    }
}

pub fn create_conflict_markers(ours: &str, theirs: &str, labels: &ConflictLabels) -> String {
    let mut text = String::with_capacity(ours.len() + theirs.len() + 64);

    text.push_str(&format!("{OURS_MARKER} {}\n", labels.ours));
    push_side(&mut text, ours);
    text.push_str(SEPARATOR);
    text.push('\n');
    push_side(&mut text, theirs);
    text.push_str(&format!("{THEIRS_MARKER} {}\n", labels.theirs));

    text
}

fn push_side(text: &mut String, side: &str) {
    text.push_str(side);
    if !side.is_empty() && !side.ends_with('\n') {
        text.push('\n');
    }
}

/// Both sides of the first conflict block in `text`
pub fn parse_conflict_markers(text: &str) -> Option<(String, String)> {
    let mut ours = String::new();
    let mut theirs = String::new();
    let mut section = 0;

    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);

        match section {
            0 if bare.starts_with(OURS_MARKER) => section = 1,
            1 if bare == SEPARATOR => section = 2,
            1 => ours.push_str(line),
            2 if bare.starts_with(THEIRS_MARKER) => return Some((ours, theirs)),
            2 => theirs.push_str(line),
            _ => {}
        }
    }

    None
}

pub fn has_conflict_markers(text: &str) -> bool {
    parse_conflict_markers(text).is_some()
}
