//! View model for the todo list.
//!
//! [`TodoView`] is derived from [`TodoState`] alone and holds every string the
//! screen shows, so the renderer only lays it out.

use crate::types::{MAX_NAME_LEN, TodoState};
use todo_table::TaskId;

/// Heading of the view
pub const TITLE: &str = "Todo List";
/// Placeholder shown in the empty input
pub const INPUT_PLACEHOLDER: &str = "New Todo...";
/// Label of the create button
pub const ADD_LABEL: &str = "Add Todo";
/// Body shown while the first load is in flight
pub const LOADING_TEXT: &str = "Loading todos...";
/// Body shown when there are no tasks
pub const EMPTY_TEXT: &str = "No todos yet. Add your first todo!";
/// Toggle label for a completed task
pub const UNDO_LABEL: &str = "Undo";
/// Toggle label for an open task
pub const COMPLETE_LABEL: &str = "Complete";
/// Label of the delete control
pub const DELETE_LABEL: &str = "Delete";

/// Everything the screen shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoView {
    /// Heading
    pub title: &'static str,
    /// "Total tasks: N"
    pub total: String,
    /// Most recent failure message
    pub error: Option<String>,
    /// The new-task input
    pub input: InputView,
    /// Whether the create button accepts presses
    pub add_enabled: bool,
    /// List area
    pub body: ListBody,
}

/// The new-task input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputView {
    /// Current text
    pub value: String,
    /// Shown while `value` is empty
    pub placeholder: &'static str,
    /// Longest accepted text, in characters
    pub max_len: usize,
    /// Whether edits are accepted
    pub enabled: bool,
}

/// Content of the list area
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListBody {
    /// Busy with nothing to show yet
    Loading(&'static str),
    /// No tasks
    Empty(&'static str),
    /// One row per task, in state order
    Rows(Vec<TaskRow>),
}

/// One task in the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRow {
    /// Task id, passed back with toggle and delete
    pub id: TaskId,
    /// Task name
    pub name: String,
    /// Completed rows are drawn struck through
    pub is_completed: bool,
    /// "Undo" or "Complete"
    pub toggle_label: &'static str,
    /// "Delete"
    pub delete_label: &'static str,
    /// Whether toggle and delete accept presses
    pub enabled: bool,
}

impl TodoView {
    /// Builds the view for `state`
    #[must_use]
    pub fn from_state(state: &TodoState) -> Self {
        let enabled = !state.is_busy();

        let body = if state.tasks.is_empty() {
            if state.is_busy() {
                ListBody::Loading(LOADING_TEXT)
            } else {
                ListBody::Empty(EMPTY_TEXT)
            }
        } else {
            ListBody::Rows(
                state
                    .tasks
                    .iter()
                    .map(|task| TaskRow {
                        id: task.id,
                        name: task.name.clone(),
                        is_completed: task.is_completed,
                        toggle_label: if task.is_completed {
                            UNDO_LABEL
                        } else {
                            COMPLETE_LABEL
                        },
                        delete_label: DELETE_LABEL,
                        enabled,
                    })
                    .collect(),
            )
        };

        Self {
            title: TITLE,
            total: format!("Total tasks: {}", state.count()),
            error: state.last_error.clone(),
            input: InputView {
                value: state.pending_input.clone(),
                placeholder: INPUT_PLACEHOLDER,
                max_len: MAX_NAME_LEN,
                enabled,
            },
            add_enabled: enabled && !state.pending_input.trim().is_empty(),
            body,
        }
    }

    /// Rows of the list, empty while loading or when there are no tasks
    #[must_use]
    pub fn rows(&self) -> &[TaskRow] {
        match &self.body {
            ListBody::Rows(rows) => rows,
            ListBody::Loading(_) | ListBody::Empty(_) => &[],
        }
    }
}
