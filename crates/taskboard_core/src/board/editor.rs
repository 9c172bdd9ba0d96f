//! Task editor dialog state.

use crate::model::task::TaskId;

/// What the task editor is doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    /// Saving creates a new task.
    Creating,
    /// Saving updates the task with this id.
    Editing(TaskId),
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn editing_id(&self) -> Option<&TaskId> {
        match self {
            Self::Editing(id) => Some(id),
            _ => None,
        }
    }
}
