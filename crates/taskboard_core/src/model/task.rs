//! Task domain model.
//!
//! # Responsibility
//! - Define the task record exchanged with the remote store.
//! - Define the draft/patch shapes used by create and update flows.
//! - Parse status labels leniently while keeping the status closed.
//!
//! # Invariants
//! - `status` is always one of `Todo|InProgress|Done`.
//! - `created_at` is set once by the creator and never recomputed.
//! - `id` is non-blank; it is opaque and assigned by the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque task identity assigned by the remote store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = String;

/// Board status of a task. Each status is rendered as one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Work is in progress.
    InProgress,
    /// Completed.
    Done,
}

impl TaskStatus {
    /// Column order used when rendering the whole board.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Canonical wire value.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Human-readable column heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "TO DO",
            Self::InProgress => "IN PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Error returned when a status label is not one of the three columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown task status `{}`; expected TODO|IN_PROGRESS|DONE",
            self.0
        )
    }
}

impl Error for UnknownStatus {}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; space, `-` and `_` are interchangeable, so both
    /// `IN_PROGRESS` and the column heading `In Progress` are accepted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Why: records written by older boards store the column heading
        // rather than the wire value.
        let normalized: String = value
            .trim()
            .chars()
            .filter_map(|ch| match ch {
                ' ' | '-' | '_' => None,
                other => Some(other.to_ascii_uppercase()),
            })
            .collect();

        match normalized.as_str() {
            "TODO" => Ok(Self::Todo),
            "INPROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Render order for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest `created_at` first.
    #[default]
    Recent,
    /// Oldest `created_at` first.
    Oldest,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unsupported sort mode `{other}`; expected recent|oldest")),
        }
    }
}

/// Validation errors for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task id is empty after trim.
    BlankId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "task id must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record as stored remotely and held by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    /// Document id. Read from `id`, else from the document key `_id`.
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Creation instant, assigned by the client that created the task.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Validates record-level invariants not expressible in the type.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::BlankId);
        }
        Ok(())
    }

    /// Shallow-merges `patch` into this record.
    ///
    /// Fields absent from the patch are preserved; `id` and `created_at`
    /// are never touched.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Wire shape of a stored task as decoded from the store.
///
/// Document backends send `_id`, and also `id` when virtual fields are on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: Option<TaskId>,
    #[serde(rename = "_id")]
    document_id: Option<TaskId>,
    title: String,
    #[serde(default)]
    description: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
}

/// Error for a stored record that carries neither `id` nor `_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTaskId;

impl Display for MissingTaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "task record has neither `id` nor `_id`")
    }
}

impl Error for MissingTaskId {}

impl TryFrom<TaskRecord> for Task {
    type Error = MissingTaskId;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let id = record.id.or(record.document_id).ok_or(MissingTaskId)?;
        Ok(Self {
            id,
            title: record.title,
            description: record.description,
            status: record.status,
            created_at: record.created_at,
        })
    }
}

/// User-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Builds the create request body: status `TODO`, created `now`.
    pub fn into_new_task(self, now: DateTime<Utc>) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            status: TaskStatus::Todo,
            created_at: now,
        }
    }
}

/// Create request body. The store answers with the full `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update. `None` fields are omitted from the wire body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Status-only patch sent by drag-and-drop moves.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Editor save patch: title and description, status untouched.
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            status: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{SortMode, TaskStatus};

    #[test]
    fn status_parses_wire_values_and_column_labels() {
        assert_eq!("TODO".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("TO DO".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!(
            "in progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            "IN_PROGRESS".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(" done ".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
    }

    #[test]
    fn status_rejects_unknown_values() {
        let err = "blocked".parse::<TaskStatus>().unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn sort_mode_parses_case_insensitively() {
        assert_eq!("Recent".parse::<SortMode>().unwrap(), SortMode::Recent);
        assert_eq!("OLDEST".parse::<SortMode>().unwrap(), SortMode::Oldest);
        assert!("newest".parse::<SortMode>().is_err());
    }
}
