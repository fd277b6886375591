//! Task records as stored in the remote table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a task name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Identifier assigned by the remote table when a task is inserted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Wraps a raw identity value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identity value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item as returned by the remote table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier
    pub id: TaskId,
    /// User-supplied label
    pub name: String,
    /// Whether the task is done
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
    /// Insert timestamp, when the table exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an open task without a timestamp
    #[must_use]
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_completed: false,
            created_at: None,
        }
    }

    /// Sets the completion flag
    #[must_use]
    pub const fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }
}

/// Insert payload; the table assigns `id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task label
    pub name: String,
    /// Always `false` for new tasks
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl TaskDraft {
    /// Draft for a new, open task
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_completed: false,
        }
    }
}

/// Update payload for the completion flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New value of the completion flag
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl TaskPatch {
    /// Patch that sets the completion flag
    #[must_use]
    pub const fn completion(is_completed: bool) -> Self {
        Self { is_completed }
    }
}
