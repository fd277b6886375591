//! # Todo Runtime
//!
//! The [`Store`] owns controller state, runs the reducer for every action it
//! receives and spawns the effects the reducer returns. An effect that
//! resolves to an action sends it back into the same Store.
//!
//! ## Example
//!
//! ```ignore
//! use todo_runtime::Store;
//!
//! let store = Store::new(TodoState::new(), TodoReducer::new(), environment);
//!
//! // Send an action and wait for its remote call to be reconciled
//! store.send(TodoAction::Refresh).await?.wait().await;
//!
//! let count = store.state(|s| s.count()).await;
//! ```
//!
//! ## Metrics
//!
//! The Store records `store.commands.total` and `store.effects.executed`
//! through the `metrics` facade. They are dropped unless the binary installs
//! a recorder.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use todo_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown gave up with effects still running
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// No matching action arrived in time
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Completion handle for the effects of one action
///
/// Returned by [`Store::send()`]. [`wait`](Self::wait) returns once every
/// effect the action started has finished and the action it produced, if
/// any, has been reduced.
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    done: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let running = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = watch::channel(());

        let handle = Self {
            running: Arc::clone(&running),
            done: done_rx,
        };
        (
            handle,
            EffectTracking {
                running,
                done: Arc::new(done_tx),
            },
        )
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            if self.done.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Sender side of an [`EffectHandle`]
struct EffectTracking {
    running: Arc<AtomicUsize>,
    done: Arc<watch::Sender<()>>,
}

/// Counts one running effect against its handle and the Store
///
/// Dropping the guard releases both counts, including when the effect task
/// panics.
struct EffectGuard {
    running: Arc<AtomicUsize>,
    done: Arc<watch::Sender<()>>,
    store_pending: Arc<AtomicUsize>,
}

impl EffectGuard {
    fn enter(tracking: &EffectTracking, store_pending: &Arc<AtomicUsize>) -> Self {
        tracking.running.fetch_add(1, Ordering::SeqCst);
        store_pending.fetch_add(1, Ordering::SeqCst);
        Self {
            running: Arc::clone(&tracking.running),
            done: Arc::clone(&tracking.done),
            store_pending: Arc::clone(store_pending),
        }
    }
}

impl Drop for EffectGuard {
    fn drop(&mut self) {
        self.store_pending.fetch_sub(1, Ordering::SeqCst);
        if self.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.done.send(());
        }
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, EffectGuard, EffectHandle,
        EffectTracking, Ordering, Reducer, RwLock, StoreError,
    };
    use tokio::sync::broadcast;

    type Feedback<'a> = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<EffectHandle, StoreError>> + Send + 'a>,
    >;

    /// Capacity of the channel carrying effect-produced actions to observers
    const OBSERVER_CAPACITY: usize = 16;

    /// Runs a reducer over shared state
    ///
    /// The reducer always runs under the write lock, so two actions never
    /// mutate state at the same time. Effects run as spawned tasks and may
    /// finish in any order.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        closing: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Every action produced by an effect, for `send_and_wait_for`
        produced: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (produced, _) = broadcast::channel(OBSERVER_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                closing: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                produced,
            }
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Stop accepting actions and wait for running effects
        ///
        /// Effects are never cancelled; `timeout` only bounds the wait.
        /// Actions produced by effects after this call are dropped.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running when `timeout` expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.closing.store(true, Ordering::Release);

            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    tracing::info!("All effects completed");
                    return Ok(());
                }
                if tokio::time::Instant::now() >= deadline {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    return Err(StoreError::ShutdownTimeout(pending));
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }

        /// Reduce `action` and start the effects it returns
        ///
        /// Returns once the effects are spawned. Use the returned
        /// [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.closing.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }
            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut *state, action, &self.environment)
            };

            let (handle, tracking) = EffectHandle::new();
            for effect in effects {
                self.spawn_effect(effect, &tracking);
            }
            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Subscribes before sending so a fast effect cannot be missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::ChannelClosed`]: action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.produced.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&*self.state.read().await)
        }

        fn spawn_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    let guard = EffectGuard::enter(tracking, &self.pending_effects);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        if let Some(action) = fut.await {
                            let _ = store.produced.send(action.clone());
                            // Boxed to break the send -> spawn -> send future cycle.
                            let feedback: Feedback<'_> = Box::pin(store.send(action));
                            if let Err(error) = feedback.await {
                                tracing::warn!(%error, "Dropped action produced by effect");
                            }
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                closing: Arc::clone(&self.closing),
                pending_effects: Arc::clone(&self.pending_effects),
                produced: self.produced.clone(),
            }
        }
    }
}

pub use store::Store;
