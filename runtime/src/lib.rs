//! # Lead Capture Runtime
//!
//! Runtime implementation for the lead capture pipeline.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation Registry**: Tracks cancellable effects so a newer one supersedes an older one
//!
//! ## Example
//!
//! ```ignore
//! use lead_capture_runtime::Store;
//!
//! let store = Store::new(SubmissionState::default(), SubmissionReducer::new(), environment);
//!
//! // Send an action
//! store.send(SubmissionAction::Submit).await?;
//!
//! // Read state
//! let in_flight = store.state(|s| s.in_flight()).await;
//! ```

use lead_capture_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::{AbortHandle, JoinHandle};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a terminal action or for the store to go idle
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;
pub use store::Store;

/// A spawned unit of effect work
type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

tokio::task_local! {
    /// Registration (id, generation) of the cancellable task being polled
    static REGISTRATION: (EffectId, u64);
}

/// Counter of running effect tasks with an idle notification
#[derive(Clone)]
struct PendingEffects {
    count: Arc<AtomicUsize>,
    idle: Arc<watch::Sender<()>>,
}

impl PendingEffects {
    fn new() -> Self {
        let (idle, _) = watch::channel(());
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(idle),
        }
    }

    /// Count a new task; the returned guard un-counts it on drop
    fn track(&self) -> PendingGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        PendingGuard(self.clone())
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    async fn wait_for_zero(&self) {
        // Subscribe before reading the counter so no notification is missed
        let mut rx = self.idle.subscribe();
        while self.len() > 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// RAII guard that decrements the pending counter on drop
///
/// Aborted tasks drop their future, so cancelled effects are un-counted too.
struct PendingGuard(PendingEffects);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.send_modify(|()| {});
        }
    }
}

/// Live cancellable tasks keyed by effect id
///
/// Each registration carries a generation so a finished task only removes
/// its own entry, never the one that superseded it.
#[derive(Clone, Default)]
struct CancellationRegistry {
    entries: Arc<Mutex<HashMap<EffectId, (u64, AbortHandle)>>>,
    generation: Arc<AtomicU64>,
}

impl CancellationRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, (u64, AbortHandle)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst)
    }

    fn release(&self, id: EffectId, generation: u64) {
        let mut entries = self.lock();
        if entries.get(&id).is_some_and(|(current, _)| *current == generation) {
            entries.remove(&id);
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        AbortHandle, Arc, AtomicBool, CancellationRegistry, Duration, Effect, EffectId,
        JoinHandle, Ordering, PendingEffects, REGISTRATION, Reducer, RwLock, StoreError, Task,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Actions are reduced one at a time under the state write lock. Every
    /// top-level effect runs in its own tokio task, so a slow network call
    /// never blocks timers or later submissions.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        pending: PendingEffects,
        cancellations: CancellationRegistry,
        shutdown: Arc<AtomicBool>,
        /// Every action produced by an effect is broadcast here once it has
        /// been reduced.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                pending: self.pending.clone(),
                cancellations: self.cancellations.clone(),
                shutdown: Arc::clone(&self.shutdown),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast channel holds 16 actions; increase it with
        /// [`Store::with_broadcast_capacity`] for chatty reducers.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(16);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                pending: PendingEffects::new(),
                cancellations: CancellationRegistry::default(),
                shutdown: Arc::new(AtomicBool::new(false)),
                action_broadcast,
            }
        }

        /// Replace the action broadcast channel with one of `capacity` slots
        #[must_use]
        pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));
            self.action_broadcast = action_broadcast;
            self
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock, then starts every
        /// returned effect. Returns once the effects are started, not once
        /// they finish; use [`Store::wait_for_idle`] for that.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.dispatch(action, false).await
        }

        /// Reduce `action`, optionally broadcast it, then start its effects
        ///
        /// Broadcasting between the two steps means observers see the action
        /// after state reflects it and before any action its effects produce.
        async fn dispatch(&self, action: A, broadcast: bool) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::warn!("Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let observed = broadcast.then(|| action.clone());
            let effects = {
                let mut state = self.state.write().await;
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            if let Some(action) = observed {
                let _ = self.action_broadcast.send(action);
            }

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Subscribes before sending, so a fast effect cannot slip past. The
        /// matching action has already been reduced when this returns.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
        /// - [`StoreError::Timeout`] if no matching action arrives in time
        /// - [`StoreError::ChannelClosed`] if the broadcast channel closes
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // If the terminal action was dropped the timeout catches it
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

        /// Subscribe to all actions produced by effects
        ///
        /// Each action is delivered after it has been reduced. Actions sent
        /// directly via [`Store::send`] are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read from the current state
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Number of effect tasks currently running (timers included)
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending.len()
        }

        /// Wait until no effect task is running
        ///
        /// Feedback actions are reduced before their parent task finishes, so
        /// effects they start are counted before the parent is un-counted.
        pub async fn wait_for_idle(&self) {
            self.pending.wait_for_zero().await;
        }

        /// [`Store::wait_for_idle`] bounded by `timeout`
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Timeout`] if effects are still running when the
        /// timeout elapses.
        pub async fn wait_for_idle_with_timeout(&self, timeout: Duration) -> Result<(), StoreError> {
            tokio::time::timeout(timeout, self.wait_for_idle())
                .await
                .map_err(|_| StoreError::Timeout)
        }

        /// Abort the cancellable effect registered under `id`
        ///
        /// Returns `false` if nothing was registered.
        pub fn cancel(&self, id: EffectId) -> bool {
            let removed = self.cancellations.lock().remove(&id);
            removed.is_some_and(|(_, handle)| {
                Self::abort(id, &handle);
                true
            })
        }

        /// Stop accepting actions, abort cancellable effects and wait for the rest
        ///
        /// Actions produced by effects that finish during shutdown are dropped.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running if they do not finish within `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::SeqCst);

            let cancellable: Vec<_> = self.cancellations.lock().drain().collect();
            for (id, (_, handle)) in cancellable {
                Self::abort(id, &handle);
            }

            if tokio::time::timeout(timeout, self.wait_for_idle()).await.is_err() {
                let remaining = self.pending.len();
                tracing::error!(remaining, "Shutdown timed out");
                return Err(StoreError::ShutdownTimeout(remaining));
            }

            tracing::info!("All effects completed, shutdown successful");
            Ok(())
        }

        fn abort(id: EffectId, handle: &AbortHandle) {
            if !handle.is_finished() {
                tracing::debug!(effect_id = %id, "Cancelling effect");
                metrics::counter!("store.effects.cancelled").increment(1);
            }
            handle.abort();
        }

        /// Start a top-level effect
        fn execute_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Cancellable { id, effect } => {
                    let _ = self.spawn_cancellable(id, *effect);
                },
                effect => {
                    let task = self.run_effect(effect);
                    let _ = self.spawn_tracked(task);
                },
            }
        }

        fn spawn_tracked(&self, task: Task) -> JoinHandle<()> {
            let guard = self.pending.track();
            tokio::spawn(async move {
                let _guard = guard;
                task.await;
            })
        }

        fn spawn_cancellable(&self, id: EffectId, effect: Effect<A>) -> JoinHandle<()> {
            tracing::trace!(effect_id = %id, "Executing Effect::Cancellable");
            metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);

            let generation = self.cancellations.next_generation();
            let registry = self.cancellations.clone();
            let task = self.run_effect(effect);

            // Set when a timer's own feedback schedules the next timer under
            // the same id; that task is finishing, not being superseded.
            let caller = REGISTRATION.try_with(|registration| *registration).ok();

            // Hold the registry lock until the new handle is recorded so the
            // task cannot deregister before it is registered.
            let mut entries = self.cancellations.lock();
            if let Some((previous_generation, previous)) = entries.remove(&id) {
                if caller == Some((id, previous_generation)) {
                    tracing::trace!(effect_id = %id, "Effect re-registered by its own task");
                } else {
                    Self::abort(id, &previous);
                }
            }

            let handle = self.spawn_tracked(Box::pin(REGISTRATION.scope(
                (id, generation),
                async move {
                    task.await;
                    registry.release(id, generation);
                },
            )));
            entries.insert(id, (generation, handle.abort_handle()));
            handle
        }

        /// Turn an effect description into a future that performs it
        fn run_effect(&self, effect: Effect<A>) -> Task {
            let store = self.clone();
            match effect {
                Effect::None => Box::pin(async {}),
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    Box::pin(async move {
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.feedback(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    })
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    Box::pin(async move {
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay completed, sending action");
                        store.feedback(*action).await;
                    })
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    let tasks: Vec<Task> = effects
                        .into_iter()
                        .map(|effect| self.run_effect(effect))
                        .collect();
                    Box::pin(async move {
                        futures::future::join_all(tasks).await;
                    })
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                    Box::pin(async move {
                        for effect in effects {
                            store.run_effect(effect).await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    })
                },
                Effect::Cancellable { id, effect } => {
                    let handle = self.spawn_cancellable(id, *effect);
                    Box::pin(async move {
                        // A cancelled child ends this step early
                        let _ = handle.await;
                    })
                },
            }
        }

        /// Reduce an effect-produced action and broadcast it
        async fn feedback(&self, action: A) {
            if let Err(error) = self.dispatch(action, true).await {
                tracing::warn!(%error, "Dropped action produced by effect");
            }
        }
    }
}
