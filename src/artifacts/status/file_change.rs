use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Difference between the working copy and what the next commit would record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChangeType {
    Untracked,
    Modified,
    Deleted,
}

/// Difference between what the next commit would record and HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexChangeType {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Workspace(WorkspaceChangeType),
    Index(IndexChangeType),
    Conflicted,
}

impl FileChangeType {
    /// Two-column short code, index column first
    pub fn short_code(&self) -> &'static str {
        match self {
            FileChangeType::Index(IndexChangeType::Added) => "A ",
            FileChangeType::Index(IndexChangeType::Modified) => "M ",
            FileChangeType::Index(IndexChangeType::Deleted) => "D ",
            FileChangeType::Workspace(WorkspaceChangeType::Modified) => " M",
            FileChangeType::Workspace(WorkspaceChangeType::Deleted) => " D",
            FileChangeType::Workspace(WorkspaceChangeType::Untracked) => "??",
            FileChangeType::Conflicted => "UU",
        }
    }
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileChangeType::Workspace(WorkspaceChangeType::Untracked) => "".normal(),
            FileChangeType::Workspace(WorkspaceChangeType::Modified) => "modified:   ".red(),
            FileChangeType::Workspace(WorkspaceChangeType::Deleted) => "deleted:    ".red(),
            FileChangeType::Index(IndexChangeType::Added) => "new file:   ".green(),
            FileChangeType::Index(IndexChangeType::Modified) => "modified:   ".green(),
            FileChangeType::Index(IndexChangeType::Deleted) => "deleted:    ".green(),
            FileChangeType::Conflicted => "both modified:   ".red(),
        };
        write!(f, "{:>width$}{}", "", label, width = LABEL_WIDTH)
    }
}
