//! Working-copy migration between two snapshots
//!
//! A migration is planned completely before anything touches the disk, so
//! that local changes in the way can be reported up front.

use crate::areas::database::FileMap;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Add,
    Delete,
    Modify,
}

/// One planned file system change; deletions carry no target content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub action: ActionType,
    pub target: Option<(ObjectId, FileMode)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migration {
    actions: BTreeMap<PathBuf, Action>,
}

impl Migration {
    pub fn plan(from: &FileMap, to: &FileMap) -> Self {
        let mut actions = BTreeMap::new();

        for (path, current) in from {
            match to.get(path) {
                None => {
                    actions.insert(
                        path.clone(),
                        Action {
                            action: ActionType::Delete,
                            target: None,
                        },
                    );
                }
                Some(target) if target != current => {
                    actions.insert(
                        path.clone(),
                        Action {
                            action: ActionType::Modify,
                            target: Some(target.clone()),
                        },
                    );
                }
                Some(_) => {}
            }
        }

        for (path, target) in to {
            if !from.contains_key(path) {
                actions.insert(
                    path.clone(),
                    Action {
                        action: ActionType::Add,
                        target: Some(target.clone()),
                    },
                );
            }
        }

        Migration { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.actions.keys().map(PathBuf::as_path)
    }

    /// Actions of one kind, in path order
    pub fn actions_of(&self, action: ActionType) -> impl Iterator<Item = (&Path, &Action)> {
        self.actions
            .iter()
            .filter(move |(_, planned)| planned.action == action)
            .map(|(path, planned)| (path.as_path(), planned))
    }
}
