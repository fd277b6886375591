//! Todo list controller over a hosted table.
//!
//! The list of tasks lives in a remote table; this crate keeps a local copy
//! and drives the four remote operations through a reducer:
//!
//! - Refresh, create, toggle-complete and delete, one at a time
//! - Fixed user-facing error messages per operation
//! - A busy flag while a remote call is in flight
//! - A pure view model and a terminal front end
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_app::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//! use todo_table::RestTaskTable;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = RestTaskTable::from_env()?;
//! let env = TodoEnvironment::new(Arc::new(table));
//! let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load every task and wait for the table to answer
//! store.send(TodoAction::Refresh).await?.wait().await;
//!
//! store
//!     .send(TodoAction::InputChanged { text: "Buy milk".to_string() })
//!     .await?;
//! store.send(TodoAction::Create).await?.wait().await;
//!
//! let state = store.state(Clone::clone).await;
//! println!("Total tasks: {}", state.count());
//! # Ok(())
//! # }
//! ```

pub mod reducer;
pub mod telemetry;
pub mod tui;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{TodoAction, TodoError, TodoOperation, TodoState};
pub use view::TodoView;

/// Store running the todo reducer
pub type TodoStore = todo_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
