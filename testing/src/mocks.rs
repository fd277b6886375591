//! In-memory task table for fast, deterministic tests
//!
//! Behaves like the hosted table: ids are assigned on insert starting at 1,
//! rows come back in insertion order, and update/delete on an unknown id
//! succeed without touching anything. Any call can be made to fail, and
//! every call is recorded.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_table::{TableError, TableFuture, Task, TaskDraft, TaskId, TaskPatch, TaskTable};

/// One call against the table, as recorded by [`InMemoryTaskTable`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TableCall {
    /// `list_all`
    ListAll,
    /// `insert_one`
    InsertOne,
    /// `update_by_id`
    UpdateById,
    /// `delete_by_id`
    DeleteById,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Task>,
    next_id: i64,
    failing: HashSet<TableCall>,
    calls: Vec<TableCall>,
    latency: Option<Duration>,
}

/// Task table kept in memory
///
/// Clones share the same rows.
///
/// # Example
///
/// ```
/// use todo_testing::{InMemoryTaskTable, TableCall};
/// use todo_table::{TaskDraft, TaskTable};
///
/// # async fn example() -> Result<(), todo_table::TableError> {
/// let table = InMemoryTaskTable::new();
/// let task = table.insert_one(TaskDraft::new("Buy milk")).await?;
/// assert_eq!(task.id.get(), 1);
///
/// table.fail_on(TableCall::ListAll);
/// assert!(table.list_all().await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTaskTable {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaskTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding `tasks`; new ids continue after the largest one
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rows: tasks,
                next_id,
                ..Inner::default()
            })),
        }
    }

    /// Delay every call by `latency` before it touches the rows
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.lock().unwrap().latency = Some(latency);
        self
    }

    /// Make every subsequent `call` fail
    pub fn fail_on(&self, call: TableCall) {
        self.inner.lock().unwrap().failing.insert(call);
    }

    /// Let `call` succeed again
    pub fn recover(&self, call: &TableCall) {
        self.inner.lock().unwrap().failing.remove(call);
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<TableCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Current rows, in table order
    #[must_use]
    pub fn rows(&self) -> Vec<Task> {
        self.inner.lock().unwrap().rows.clone()
    }

    /// This table as a shared trait object
    #[must_use]
    pub fn shared(&self) -> Arc<dyn TaskTable> {
        Arc::new(self.clone())
    }

    /// Record `call` and return its configured latency, or the injected failure
    fn begin(&self, call: TableCall) -> Result<Option<Duration>, TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call.clone());
        if inner.failing.contains(&call) {
            return Err(TableError::Api {
                status: 503,
                message: format!("injected {call:?} failure"),
            });
        }
        Ok(inner.latency)
    }

    async fn pause(latency: Option<Duration>) {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl TaskTable for InMemoryTaskTable {
    fn list_all(&self) -> TableFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let latency = self.begin(TableCall::ListAll)?;
            Self::pause(latency).await;
            Ok(self.rows())
        })
    }

    fn insert_one(&self, draft: TaskDraft) -> TableFuture<'_, Task> {
        Box::pin(async move {
            let latency = self.begin(TableCall::InsertOne)?;
            Self::pause(latency).await;

            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let task = Task::new(inner.next_id, draft.name).completed(draft.is_completed);
            inner.rows.push(task.clone());
            Ok(task)
        })
    }

    fn update_by_id(&self, id: TaskId, patch: TaskPatch) -> TableFuture<'_, ()> {
        Box::pin(async move {
            let latency = self.begin(TableCall::UpdateById)?;
            Self::pause(latency).await;

            let mut inner = self.inner.lock().unwrap();
            if let Some(row) = inner.rows.iter_mut().find(|t| t.id == id) {
                row.is_completed = patch.is_completed;
            }
            Ok(())
        })
    }

    fn delete_by_id(&self, id: TaskId) -> TableFuture<'_, ()> {
        Box::pin(async move {
            let latency = self.begin(TableCall::DeleteById)?;
            Self::pause(latency).await;

            self.inner.lock().unwrap().rows.retain(|t| t.id != id);
            Ok(())
        })
    }
}
