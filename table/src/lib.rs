//! # Todo Table
//!
//! Client for the hosted table that stores task records.
//!
//! The [`TaskTable`] trait is the whole contract the controller depends on:
//! list every task, insert one, update one by id, delete one by id. Every call
//! returns a `Result` with a [`TableError`]; nothing is signalled by panicking.
//!
//! ## Example
//!
//! ```no_run
//! use todo_table::{RestTaskTable, TaskDraft, TaskTable};
//!
//! # async fn example() -> Result<(), todo_table::TableError> {
//! let table = RestTaskTable::from_env()?;
//!
//! let created = table.insert_one(TaskDraft::new("Buy milk")).await?;
//! let all = table.list_all().await?;
//! assert!(all.iter().any(|t| t.id == created.id));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod rest;

pub use client::{TableFuture, TaskTable};
pub use config::TableConfig;
pub use error::TableError;
pub use record::{MAX_NAME_LEN, Task, TaskDraft, TaskId, TaskPatch};
pub use rest::RestTaskTable;
