//! # Todo Testing
//!
//! Testing utilities for the todo controller.
//!
//! This crate provides:
//! - [`InMemoryTaskTable`]: a deterministic remote table with failure injection
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`helpers`]: drive effects to the actions they produce without a Store
//!
//! ## Example
//!
//! ```ignore
//! use todo_testing::{InMemoryTaskTable, TableCall};
//!
//! #[tokio::test]
//! async fn refresh_failure() {
//!     let table = InMemoryTaskTable::new();
//!     table.fail_on(TableCall::ListAll);
//!
//!     let store = Store::new(TodoState::new(), TodoReducer::new(), TodoEnvironment::new(table.shared()));
//!     store.send(TodoAction::Refresh).await?.wait().await;
//!
//!     assert_eq!(store.state(|s| s.last_error.clone()).await.as_deref(), Some("Failed to fetch todos"));
//! }
//! ```

/// In-memory remote table
pub mod mocks;

/// Fluent reducer assertions
pub mod reducer_test;

/// Test helpers and utilities
pub mod helpers {
    use todo_core::{effect::Effect, reducer::Reducer};

    /// Execute effects in place and collect the actions they produce
    ///
    /// Effects run one after another in declaration order, so the result is
    /// deterministic.
    pub async fn run_effects<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            if let Effect::Future(fut) = effect {
                actions.extend(fut.await);
            }
        }
        actions
    }

    /// Reduce `action`, run its effects, and feed every produced action back
    /// until nothing is left
    ///
    /// Returns the actions produced by effects, in the order they were reduced.
    pub async fn settle<R>(
        reducer: &R,
        state: &mut R::State,
        action: R::Action,
        env: &R::Environment,
    ) -> Vec<R::Action>
    where
        R: Reducer,
        R::Action: Clone + Send,
    {
        let mut produced = Vec::new();
        let mut queue = std::collections::VecDeque::from([action]);

        while let Some(next) = queue.pop_front() {
            let effects = reducer.reduce(state, next, env);
            for action in run_effects(effects).await {
                produced.push(action.clone());
                queue.push_back(action);
            }
        }

        produced
    }
}

pub use mocks::{InMemoryTaskTable, TableCall};
pub use reducer_test::{ReducerTest, assertions};
