//! The remote table contract.
//!
//! The controller only ever sees this trait. It mirrors the four calls the
//! hosted database SDK offers on a single collection, each returning an
//! explicit `Result` instead of signalling failure out of band.
//!
//! # Implementations
//!
//! - [`RestTaskTable`](crate::RestTaskTable): PostgREST endpoint over HTTP
//! - `InMemoryTaskTable` (in `todo-testing`): deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! table can be held as `Arc<dyn TaskTable>` and captured by effects.

use crate::error::Result;
use crate::record::{Task, TaskDraft, TaskId, TaskPatch};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TaskTable`] methods
pub type TableFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A single named collection of task records
pub trait TaskTable: Send + Sync {
    /// Fetch every record, in the order the table returns them.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`](crate::TableError) if the request fails or
    /// the rows cannot be decoded.
    fn list_all(&self) -> TableFuture<'_, Vec<Task>>;

    /// Insert one record and return it with its assigned `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`](crate::TableError) if the insert is rejected
    /// or no row comes back.
    fn insert_one(&self, draft: TaskDraft) -> TableFuture<'_, Task>;

    /// Apply `patch` to the record with `id`.
    ///
    /// Matching no record is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`](crate::TableError) if the update is rejected.
    fn update_by_id(&self, id: TaskId, patch: TaskPatch) -> TableFuture<'_, ()>;

    /// Delete the record with `id`.
    ///
    /// Matching no record is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`](crate::TableError) if the delete is rejected.
    fn delete_by_id(&self, id: TaskId) -> TableFuture<'_, ()>;
}
