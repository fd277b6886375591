//! Reducer logic for the todo list.
//!
//! Every command that reaches the table follows the same shape: mark the
//! operation in flight and clear the last error, then return one effect that
//! performs the remote call and always resolves to exactly one outcome action.
//! Outcomes reconcile the local tasks from the call's result and clear the
//! in-flight marker.
//!
//! Only one operation runs at a time. Commands that arrive while another
//! operation is in flight are ignored.

use crate::types::{MAX_NAME_LEN, TodoAction, TodoOperation, TodoState};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use todo_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use todo_table::{TableError, TaskDraft, TaskId, TaskPatch, TaskTable};

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote table holding the tasks
    pub table: Arc<dyn TaskTable>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(table: Arc<dyn TaskTable>) -> Self {
        Self { table }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Marks `operation` in flight and wraps `call` into its effect
    fn begin<F>(state: &mut TodoState, operation: TodoOperation, call: F) -> Effects
    where
        F: Future<Output = Result<TodoAction, TableError>> + Send + 'static,
    {
        state.in_flight = Some(operation);
        state.last_error = None;
        smallvec![remote_call(operation, call)]
    }

    fn ignore_while_busy(state: &TodoState, action: &TodoAction) -> bool {
        if let Some(in_flight) = state.in_flight {
            tracing::debug!(?in_flight, ?action, "Ignoring command while busy");
            return true;
        }
        false
    }

    /// Applies a remote outcome to state
    fn apply_outcome(state: &mut TodoState, action: TodoAction) {
        state.in_flight = None;

        match action {
            TodoAction::Refreshed { tasks } => {
                state.tasks = tasks;
            },
            TodoAction::Created { task } => {
                if let Some(existing) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = task;
                } else {
                    state.tasks.push(task);
                }
                state.pending_input.clear();
            },
            TodoAction::Toggled { id, is_completed } => {
                if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                    task.is_completed = is_completed;
                }
            },
            TodoAction::Deleted { id } => {
                state.tasks.retain(|t| t.id != id);
            },
            TodoAction::Failed { error } => {
                state.last_error = Some(error.to_string());
            },
            // Commands are handled in `reduce`
            TodoAction::Refresh
            | TodoAction::InputChanged { .. }
            | TodoAction::Create
            | TodoAction::ToggleComplete { .. }
            | TodoAction::Delete { .. } => {},
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the effect for one remote call
///
/// The effect always yields an action: the call's outcome on success, or
/// `Failed` when the call returns an error or panics, so the in-flight marker
/// is cleared on every path.
fn remote_call<F>(operation: TodoOperation, call: F) -> Effect<TodoAction>
where
    F: Future<Output = Result<TodoAction, TableError>> + Send + 'static,
{
    async_effect! {
        let action = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(action)) => action,
            Ok(Err(error)) => {
                tracing::error!(?operation, %error, "Remote table call failed");
                TodoAction::Failed {
                    error: operation.failure(),
                }
            },
            Err(_) => {
                tracing::error!(?operation, "Remote table call panicked");
                TodoAction::Failed {
                    error: operation.failure(),
                }
            },
        };
        Some(action)
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        if action.is_command() && Self::ignore_while_busy(state, &action) {
            return SmallVec::new();
        }

        match action {
            // ========== Commands ==========
            TodoAction::Refresh => {
                let table = Arc::clone(&env.table);
                Self::begin(state, TodoOperation::Refresh, async move {
                    let tasks = table.list_all().await?;
                    Ok::<_, TableError>(TodoAction::Refreshed { tasks })
                })
            },

            TodoAction::InputChanged { text } => {
                state.pending_input = text.chars().take(MAX_NAME_LEN).collect();
                SmallVec::new()
            },

            TodoAction::Create => {
                let name: String = state
                    .pending_input
                    .trim()
                    .chars()
                    .take(MAX_NAME_LEN)
                    .collect();
                let name = name.trim_end();
                if name.is_empty() {
                    return SmallVec::new();
                }

                let draft = TaskDraft::new(name);
                let table = Arc::clone(&env.table);
                Self::begin(state, TodoOperation::Create, async move {
                    let task = table.insert_one(draft).await?;
                    Ok::<_, TableError>(TodoAction::Created { task })
                })
            },

            TodoAction::ToggleComplete { id, is_completed } => {
                let table = Arc::clone(&env.table);
                Self::begin(state, TodoOperation::ToggleComplete, async move {
                    toggle(&*table, id, !is_completed).await
                })
            },

            TodoAction::Delete { id } => {
                let table = Arc::clone(&env.table);
                Self::begin(state, TodoOperation::Delete, async move {
                    table.delete_by_id(id).await?;
                    Ok::<_, TableError>(TodoAction::Deleted { id })
                })
            },

            // ========== Outcomes ==========
            outcome => {
                Self::apply_outcome(state, outcome);
                SmallVec::new()
            },
        }
    }
}

async fn toggle(
    table: &dyn TaskTable,
    id: TaskId,
    is_completed: bool,
) -> Result<TodoAction, TableError> {
    table
        .update_by_id(id, TaskPatch::completion(is_completed))
        .await?;
    Ok(TodoAction::Toggled { id, is_completed })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::TodoError;
    use proptest::prelude::*;
    use todo_table::Task;
    use todo_testing::helpers::settle;
    use todo_testing::{InMemoryTaskTable, ReducerTest, TableCall, assertions};

    fn env_for(table: &InMemoryTaskTable) -> TodoEnvironment {
        TodoEnvironment::new(table.shared())
    }

    fn buy_milk() -> Task {
        Task::new(1, "Buy milk")
    }

    #[test]
    fn refresh_marks_busy_and_clears_error() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState {
                last_error: Some("Failed to add todo".to_string()),
                ..TodoState::new()
            })
            .when_action(TodoAction::Refresh)
            .then_state(|state| {
                assert_eq!(state.in_flight, Some(TodoOperation::Refresh));
                assert!(state.is_busy());
                assert_eq!(state.last_error, None);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();

        // The effect has not run yet.
        assert!(table.calls().is_empty());
    }

    #[test]
    fn create_with_blank_input_is_a_no_op() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState {
                pending_input: "   \t ".to_string(),
                last_error: Some("Failed to fetch todos".to_string()),
                ..TodoState::new()
            })
            .when_action(TodoAction::Create)
            .then_state(|state| {
                assert!(!state.is_busy());
                assert_eq!(state.pending_input, "   \t ");
                assert_eq!(state.last_error.as_deref(), Some("Failed to fetch todos"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn commands_are_ignored_while_busy() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState::with_tasks(vec![buy_milk()]))
            .when_action(TodoAction::Delete { id: TaskId::new(1) })
            .when_action(TodoAction::ToggleComplete {
                id: TaskId::new(1),
                is_completed: false,
            })
            .then_state(|state| {
                assert_eq!(state.in_flight, Some(TodoOperation::Delete));
                assert_eq!(state.tasks, vec![buy_milk()]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn input_is_ignored_while_busy() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState {
                pending_input: "Buy milk".to_string(),
                in_flight: Some(TodoOperation::Create),
                ..TodoState::new()
            })
            .when_action(TodoAction::InputChanged {
                text: "Buy bread".to_string(),
            })
            .then_state(|state| assert_eq!(state.pending_input, "Buy milk"))
            .run();
    }

    #[test]
    fn input_is_capped_at_max_length() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState::new())
            .when_action(TodoAction::InputChanged {
                text: "é".repeat(MAX_NAME_LEN + 20),
            })
            .then_state(|state| {
                assert_eq!(state.pending_input.chars().count(), MAX_NAME_LEN);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn outcomes_apply_even_when_idle() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState::new())
            .when_action(TodoAction::Created { task: buy_milk() })
            .when_action(TodoAction::Created {
                task: buy_milk().completed(true),
            })
            .then_state(|state| {
                // Same id twice keeps a single record.
                assert_eq!(state.tasks, vec![buy_milk().completed(true)]);
            })
            .run();
    }

    #[tokio::test]
    async fn create_appends_trimmed_task_and_clears_input() {
        let table = InMemoryTaskTable::new();
        let env = env_for(&table);
        let mut state = TodoState {
            pending_input: "  Buy milk  ".to_string(),
            ..TodoState::new()
        };

        let produced = settle(&TodoReducer::new(), &mut state, TodoAction::Create, &env).await;

        assert_eq!(produced, vec![TodoAction::Created { task: buy_milk() }]);
        assert_eq!(state.tasks, vec![buy_milk()]);
        assert_eq!(state.pending_input, "");
        assert!(!state.is_busy());
        assert_eq!(table.rows(), vec![buy_milk()]);
    }

    #[test]
    fn overlong_input_still_starts_create() {
        let table = InMemoryTaskTable::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env_for(&table))
            .given_state(TodoState {
                pending_input: "a".repeat(MAX_NAME_LEN + 50),
                ..TodoState::new()
            })
            .when_action(TodoAction::Create)
            .then_state(|state| assert_eq!(state.in_flight, Some(TodoOperation::Create)))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn overlong_input_is_capped_before_insert() {
        let table = InMemoryTaskTable::new();
        let env = env_for(&table);
        let mut state = TodoState {
            pending_input: format!("  {}  ", "a".repeat(MAX_NAME_LEN + 50)),
            ..TodoState::new()
        };

        settle(&TodoReducer::new(), &mut state, TodoAction::Create, &env).await;

        let rows = table.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "a".repeat(MAX_NAME_LEN));
        assert_eq!(state.tasks, rows);
    }

    #[tokio::test]
    async fn capped_name_drops_whitespace_at_the_cut() {
        let table = InMemoryTaskTable::new();
        let env = env_for(&table);
        let mut state = TodoState {
            pending_input: format!("{} tail", "a".repeat(MAX_NAME_LEN - 1)),
            ..TodoState::new()
        };

        settle(&TodoReducer::new(), &mut state, TodoAction::Create, &env).await;

        assert_eq!(table.rows()[0].name, "a".repeat(MAX_NAME_LEN - 1));
    }

    #[tokio::test]
    async fn create_failure_keeps_input() {
        let table = InMemoryTaskTable::new();
        table.fail_on(TableCall::InsertOne);
        let env = env_for(&table);
        let mut state = TodoState {
            pending_input: "Buy milk".to_string(),
            ..TodoState::new()
        };

        settle(&TodoReducer::new(), &mut state, TodoAction::Create, &env).await;

        assert!(state.tasks.is_empty());
        assert_eq!(state.pending_input, "Buy milk");
        assert_eq!(state.last_error.as_deref(), Some("Failed to add todo"));
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn toggle_flips_only_the_matching_task() {
        let other = Task::new(2, "Walk dog");
        let table = InMemoryTaskTable::with_tasks(vec![buy_milk(), other.clone()]);
        let env = env_for(&table);
        let mut state = TodoState::with_tasks(vec![buy_milk(), other.clone()]);

        settle(
            &TodoReducer::new(),
            &mut state,
            TodoAction::ToggleComplete {
                id: TaskId::new(1),
                is_completed: false,
            },
            &env,
        )
        .await;

        assert_eq!(state.tasks, vec![buy_milk().completed(true), other]);
        assert_eq!(table.rows()[0], buy_milk().completed(true));
    }

    #[tokio::test]
    async fn toggle_failure_leaves_tasks() {
        let table = InMemoryTaskTable::with_tasks(vec![buy_milk()]);
        table.fail_on(TableCall::UpdateById);
        let env = env_for(&table);
        let mut state = TodoState::with_tasks(vec![buy_milk()]);

        settle(
            &TodoReducer::new(),
            &mut state,
            TodoAction::ToggleComplete {
                id: TaskId::new(1),
                is_completed: false,
            },
            &env,
        )
        .await;

        assert_eq!(state.tasks, vec![buy_milk()]);
        assert_eq!(state.last_error.as_deref(), Some("Failed to update task"));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_task() {
        let other = Task::new(2, "Walk dog");
        let table = InMemoryTaskTable::with_tasks(vec![buy_milk(), other.clone()]);
        let env = env_for(&table);
        let mut state = TodoState::with_tasks(vec![buy_milk(), other.clone()]);

        settle(
            &TodoReducer::new(),
            &mut state,
            TodoAction::Delete { id: TaskId::new(1) },
            &env,
        )
        .await;

        assert_eq!(state.tasks, vec![other]);
    }

    #[tokio::test]
    async fn delete_failure_reports_error() {
        let table = InMemoryTaskTable::with_tasks(vec![buy_milk()]);
        table.fail_on(TableCall::DeleteById);
        let env = env_for(&table);
        let mut state = TodoState::with_tasks(vec![buy_milk()]);

        let produced = settle(
            &TodoReducer::new(),
            &mut state,
            TodoAction::Delete { id: TaskId::new(1) },
            &env,
        )
        .await;

        assert_eq!(
            produced,
            vec![TodoAction::Failed {
                error: TodoError::DeleteFailed
            }]
        );
        assert_eq!(state.tasks, vec![buy_milk()]);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_previous_tasks() {
        let table = InMemoryTaskTable::new();
        table.fail_on(TableCall::ListAll);
        let env = env_for(&table);
        let mut state = TodoState::with_tasks(vec![buy_milk()]);

        settle(&TodoReducer::new(), &mut state, TodoAction::Refresh, &env).await;

        assert_eq!(state.tasks, vec![buy_milk()]);
        assert_eq!(state.last_error.as_deref(), Some("Failed to fetch todos"));
        assert!(!state.is_busy());
    }

    struct PanickingTable;

    impl TaskTable for PanickingTable {
        fn list_all(&self) -> todo_table::TableFuture<'_, Vec<Task>> {
            Box::pin(async { explode::<Vec<Task>>() })
        }

        fn insert_one(&self, _draft: TaskDraft) -> todo_table::TableFuture<'_, Task> {
            Box::pin(async { explode::<Task>() })
        }

        fn update_by_id(&self, _id: TaskId, _patch: TaskPatch) -> todo_table::TableFuture<'_, ()> {
            Box::pin(async { explode::<()>() })
        }

        fn delete_by_id(&self, _id: TaskId) -> todo_table::TableFuture<'_, ()> {
            Box::pin(async { explode::<()>() })
        }
    }

    #[allow(clippy::panic)]
    fn explode<T>() -> Result<T, TableError> {
        panic!("table client panicked");
    }

    #[tokio::test]
    async fn panicking_call_still_clears_busy() {
        let env = TodoEnvironment::new(Arc::new(PanickingTable));
        let mut state = TodoState::new();

        settle(&TodoReducer::new(), &mut state, TodoAction::Refresh, &env).await;

        assert!(!state.is_busy());
        assert_eq!(state.last_error.as_deref(), Some("Failed to fetch todos"));
    }

    proptest! {
        #[test]
        fn blank_input_never_reaches_the_table(input in "[ \t\n]{0,20}") {
            let table = InMemoryTaskTable::new();
            let env = env_for(&table);
            let mut state = TodoState { pending_input: input, ..TodoState::new() };
            let before = state.clone();

            let effects = TodoReducer::new().reduce(&mut state, TodoAction::Create, &env);

            prop_assert!(effects.is_empty());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn non_blank_input_creates_trimmed_task(input in "[ a-zA-Z0-9]{0,10}[a-zA-Z0-9][ a-zA-Z0-9]{0,10}") {
            let table = InMemoryTaskTable::new();
            let env = env_for(&table);
            let mut state = TodoState { pending_input: input.clone(), ..TodoState::new() };

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let produced = runtime.block_on(settle(&TodoReducer::new(), &mut state, TodoAction::Create, &env));

            prop_assert_eq!(table.calls(), vec![TableCall::InsertOne]);
            prop_assert_eq!(produced.len(), 1);
            let rows = table.rows();
            prop_assert_eq!(rows[0].name.as_str(), input.trim());
            prop_assert_eq!(state.tasks[0].name.as_str(), input.trim());
            prop_assert!(!state.is_busy());
        }

        #[test]
        fn created_outcome_appends_exactly_one(name in "[a-zA-Z][a-zA-Z ]{0,30}", existing in 0usize..5) {
            let table = InMemoryTaskTable::new();
            let env = env_for(&table);
            let tasks: Vec<Task> = (0..existing)
                .map(|i| Task::new(i64::try_from(i).unwrap_or(0) + 1, format!("task {i}")))
                .collect();
            let mut state = TodoState {
                in_flight: Some(TodoOperation::Create),
                ..TodoState::with_tasks(tasks)
            };
            let task = Task::new(100, name.trim());

            TodoReducer::new().reduce(&mut state, TodoAction::Created { task: task.clone() }, &env);

            prop_assert_eq!(state.tasks.len(), existing + 1);
            prop_assert_eq!(state.tasks.last(), Some(&task));
            prop_assert!(!state.tasks.last().is_some_and(|t| t.is_completed));
        }
    }
}
