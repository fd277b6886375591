//! Domain types for the todo list controller.
//!
//! The state is a client-side cache of the remote table plus the transient
//! flags the view needs. Actions are either user commands or the outcome of
//! a remote call; outcomes are produced by effects, never by the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_table::{Task, TaskId};

pub use todo_table::MAX_NAME_LEN;

/// The four remote-backed operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoOperation {
    /// Reload every task
    Refresh,
    /// Insert the pending input as a new task
    Create,
    /// Flip a task's completion flag
    ToggleComplete,
    /// Remove a task
    Delete,
}

impl TodoOperation {
    /// Error surfaced when this operation fails
    #[must_use]
    pub const fn failure(self) -> TodoError {
        match self {
            Self::Refresh => TodoError::FetchFailed,
            Self::Create => TodoError::CreateFailed,
            Self::ToggleComplete => TodoError::UpdateFailed,
            Self::Delete => TodoError::DeleteFailed,
        }
    }
}

/// User-facing failure of an operation
///
/// The message is fixed per kind; details of the underlying table error are
/// only logged.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoError {
    /// `Refresh` failed
    #[error("Failed to fetch todos")]
    FetchFailed,
    /// `Create` failed
    #[error("Failed to add todo")]
    CreateFailed,
    /// `ToggleComplete` failed
    #[error("Failed to update task")]
    UpdateFailed,
    /// `Delete` failed
    #[error("Failed to delete task")]
    DeleteFailed,
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Tasks in the order the table returned them; creates append
    pub tasks: Vec<Task>,
    /// Text of the new-task input
    pub pending_input: String,
    /// Operation awaiting its remote call, if any
    pub in_flight: Option<TodoOperation>,
    /// Message of the most recent failure
    pub last_error: Option<String>,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `tasks`
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// Whether an operation is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns the number of tasks
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    /// Returns a task by id
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Checks if a task exists
    #[must_use]
    pub fn exists(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }
}

/// Actions representing user commands and remote outcomes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: reload every task from the table
    Refresh,

    /// Command: replace the new-task input
    InputChanged {
        /// Full input text
        text: String,
    },

    /// Command: insert the pending input as a task
    Create,

    /// Command: flip a task's completion flag
    ToggleComplete {
        /// Task to update
        id: TaskId,
        /// Completion flag as currently displayed
        is_completed: bool,
    },

    /// Command: delete a task
    Delete {
        /// Task to delete
        id: TaskId,
    },

    // ========== Outcomes ==========
    /// Outcome: the table returned its rows
    Refreshed {
        /// Rows in table order
        tasks: Vec<Task>,
    },

    /// Outcome: the table inserted a task
    Created {
        /// Inserted row, with its id
        task: Task,
    },

    /// Outcome: the table updated a task's completion flag
    Toggled {
        /// Updated task
        id: TaskId,
        /// New completion flag
        is_completed: bool,
    },

    /// Outcome: the table deleted a task
    Deleted {
        /// Deleted task
        id: TaskId,
    },

    /// Outcome: a remote call failed
    Failed {
        /// Which operation failed
        error: TodoError,
    },
}

impl TodoAction {
    /// Returns true for actions a user may send
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Refresh
                | Self::InputChanged { .. }
                | Self::Create
                | Self::ToggleComplete { .. }
                | Self::Delete { .. }
        )
    }

    /// Returns true for remote outcomes
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        !self.is_command()
    }
}
