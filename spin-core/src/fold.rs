//! The reduction engine behind [`Producer::scan`] and [`Producer::feedback`].
//!
//! Each subscription owns one [`Accumulator`]. Reduction steps are
//! serialized by the accumulator's lock, and the state is replaced by the
//! reducer's return value, never mutated in place. New values are queued in
//! an outbox and delivered by a single drainer at a time, outside the state
//! lock. A sink may therefore feed the loop synchronously (push a command
//! that folds more mutations) without deadlocking and without reordering
//! the delivered states.
//!
//! When the upstream run is cancelled or fails, the fold halts: no reducer
//! runs afterwards, no further command executes, and in-flight command
//! streams are cancelled.
//!
//! A feedback loop owns its lifecycle. It finishes once the upstream and
//! every in-flight command stream have finished, fails when the upstream
//! fails, and cancelling it stops the upstream and the command streams
//! still running, whatever state the upstream is in.
//!
//! [`Producer::scan`]: crate::Producer::scan
//! [`Producer::feedback`]: crate::Producer::feedback

use crate::command::Command;
use crate::config::{FoldOptions, Middleware};
use crate::lifecycle::{Completion, CompletionSignal, Lifecycle};
use crate::stream::{Observer, ReactiveStream};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The primary reducer of a fold.
pub(crate) type Reducer<R, V> = Arc<dyn Fn(R, V) -> R + Send + Sync>;

type StateOf<S> = <<S as ReactiveStream>::Value as Command>::State;
type MutationOf<S> = <<S as ReactiveStream>::Value as Command>::Mutation;

struct Outbox<R> {
    pending: VecDeque<R>,
    draining: bool,
}

/// The accumulated value of one fold.
pub(crate) struct Accumulator<R> {
    state: Mutex<R>,
    outbox: Mutex<Outbox<R>>,
    halted: AtomicBool,
}

impl<R: Clone> Accumulator<R> {
    pub(crate) fn new(initial: R) -> Self {
        Self {
            state: Mutex::new(initial),
            outbox: Mutex::new(Outbox {
                pending: VecDeque::new(),
                draining: false,
            }),
            halted: AtomicBool::new(false),
        }
    }

    pub(crate) fn snapshot(&self) -> R {
        R::clone(&self.state.lock())
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Returns `true` the first time it is called.
    pub(crate) fn halt(&self) -> bool {
        !self.halted.swap(true, Ordering::SeqCst)
    }

    /// Run one reduction step and deliver the new accumulator.
    pub(crate) fn fold<V>(
        &self,
        value: V,
        reducer: &Reducer<R, V>,
        middlewares: &[Middleware<R, V>],
        observer: &Observer<R>,
    ) {
        {
            let mut state = self.state.lock();
            if self.is_halted() {
                return;
            }
            for middleware in middlewares {
                middleware(&*state, &value);
            }
            let next = reducer((*state).clone(), value);
            *state = next.clone();
            self.outbox.lock().pending.push_back(next);
        }
        self.drain(observer);
    }

    fn drain(&self, observer: &Observer<R>) {
        {
            let mut outbox = self.outbox.lock();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }
        loop {
            let next = {
                let mut outbox = self.outbox.lock();
                match outbox.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            observer.next(next);
        }
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Folds the values of `upstream` into an accumulator.
pub(crate) struct Scan<S: ReactiveStream, R> {
    upstream: S,
    initial: R,
    reducer: Reducer<R, S::Value>,
    options: FoldOptions<R, S::Value>,
}

impl<S: ReactiveStream, R> Scan<S, R> {
    pub(crate) fn new(
        upstream: S,
        initial: R,
        reducer: Reducer<R, S::Value>,
        options: FoldOptions<R, S::Value>,
    ) -> Self {
        Self {
            upstream,
            initial,
            reducer,
            options,
        }
    }
}

impl<S, R> ReactiveStream for Scan<S, R>
where
    S: ReactiveStream,
    R: Clone + Send + 'static,
{
    type Value = R;
    type Executer = S::Executer;
    type Lifecycle = S::Lifecycle;
    type Input = Self;

    fn to_reactive_stream(self) -> Self {
        self
    }

    fn subscribe(self, observer: Observer<R>) -> S::Lifecycle {
        let Self {
            upstream,
            initial,
            reducer,
            options,
        } = self;
        let FoldOptions { middlewares, label } = options;

        let accumulator = Arc::new(Accumulator::new(initial));
        let folding = Arc::clone(&accumulator);
        let lifecycle = upstream.subscribe(Observer::new(move |value| {
            folding.fold(value, &reducer, &middlewares, &observer);
        }));

        lifecycle.after_completion(move |outcome| {
            if !outcome.is_finished() && accumulator.halt() {
                tracing::debug!(label = ?label, kind = "scan", "spin.fold.halted");
            }
        });
        lifecycle
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Executes the commands of `upstream` and folds their mutations.
pub(crate) struct Feedback<S>
where
    S: ReactiveStream,
    S::Value: Command,
{
    upstream: S,
    initial: StateOf<S>,
    reducer: Reducer<StateOf<S>, MutationOf<S>>,
    options: FoldOptions<StateOf<S>, MutationOf<S>>,
}

impl<S> Feedback<S>
where
    S: ReactiveStream,
    S::Value: Command,
{
    pub(crate) fn new(
        upstream: S,
        initial: StateOf<S>,
        reducer: Reducer<StateOf<S>, MutationOf<S>>,
        options: FoldOptions<StateOf<S>, MutationOf<S>>,
    ) -> Self {
        Self {
            upstream,
            initial,
            reducer,
            options,
        }
    }
}

impl<S> ReactiveStream for Feedback<S>
where
    S: ReactiveStream,
    S::Value: Command,
{
    type Value = StateOf<S>;
    type Executer = S::Executer;
    type Lifecycle = CompletionSignal;
    type Input = Self;

    fn to_reactive_stream(self) -> Self {
        self
    }

    fn subscribe(self, observer: Observer<StateOf<S>>) -> CompletionSignal {
        let Self {
            upstream,
            initial,
            reducer,
            options,
        } = self;
        let FoldOptions { middlewares, label } = options;

        let signal = CompletionSignal::new();
        let engine = Arc::new(FeedbackEngine::<S::Value> {
            accumulator: Accumulator::new(initial),
            in_flight: Mutex::new(InFlight::new()),
            reducer,
            middlewares,
            observer,
            label,
            signal: signal.clone(),
        });

        let executing = Arc::clone(&engine);
        let upstream = upstream.subscribe(Observer::new(move |command| {
            FeedbackEngine::execute(&executing, command);
        }));

        let stopping = Arc::clone(&engine);
        let source = upstream.clone();
        signal.after_completion(move |outcome| {
            if !outcome.is_finished() {
                source.cancel();
                stopping.terminate();
            }
        });

        upstream.after_completion(move |outcome| engine.upstream_completed(outcome));
        signal
    }
}

/// Command streams still running.
///
/// A slot is reserved (`None`) before the command executes and filled with
/// its lifecycle once subscribed.
struct InFlight<L> {
    next_id: u64,
    running: HashMap<u64, Option<L>>,
    upstream_finished: bool,
}

impl<L> InFlight<L> {
    fn new() -> Self {
        Self {
            next_id: 0,
            running: HashMap::new(),
            upstream_finished: false,
        }
    }

    fn is_idle(&self) -> bool {
        self.upstream_finished && self.running.is_empty()
    }
}

struct FeedbackEngine<C: Command> {
    accumulator: Accumulator<C::State>,
    in_flight: Mutex<InFlight<<C::Stream as ReactiveStream>::Lifecycle>>,
    reducer: Reducer<C::State, C::Mutation>,
    middlewares: Vec<Middleware<C::State, C::Mutation>>,
    observer: Observer<C::State>,
    label: Option<String>,
    signal: CompletionSignal,
}

impl<C: Command> FeedbackEngine<C> {
    fn execute(engine: &Arc<Self>, command: C) {
        // Checked under the lock so a concurrent `terminate` either drains
        // this slot or is seen here.
        let id = {
            let mut in_flight = engine.in_flight.lock();
            if engine.accumulator.is_halted() {
                return;
            }
            let id = in_flight.next_id;
            in_flight.next_id += 1;
            in_flight.running.insert(id, None);
            id
        };

        let snapshot = engine.accumulator.snapshot();
        tracing::trace!(label = ?engine.label, "spin.feedback.execute");
        let mutations = command.execute(&snapshot);

        let folding = Arc::clone(engine);
        let lifecycle = mutations.subscribe(Observer::new(move |mutation| {
            folding.accumulator.fold(
                mutation,
                &folding.reducer,
                &folding.middlewares,
                &folding.observer,
            );
        }));

        let tracked = match engine.in_flight.lock().running.get_mut(&id) {
            Some(slot) => {
                *slot = Some(lifecycle.clone());
                true
            }
            None => false,
        };
        if !tracked {
            lifecycle.cancel();
            return;
        }

        let tracking = Arc::clone(engine);
        lifecycle.after_completion(move |outcome| {
            if let Some(error) = outcome.error() {
                tracing::warn!(label = ?tracking.label, error = %error, "spin.feedback.command_failed");
            }
            tracking.release(id);
        });
    }

    fn release(&self, id: u64) {
        let idle = {
            let mut in_flight = self.in_flight.lock();
            in_flight.running.remove(&id);
            in_flight.is_idle()
        };
        if idle {
            self.signal.finish();
        }
    }

    fn upstream_completed(&self, outcome: Completion) {
        if !outcome.is_finished() {
            self.signal.complete(outcome);
            return;
        }
        let idle = {
            let mut in_flight = self.in_flight.lock();
            in_flight.upstream_finished = true;
            in_flight.is_idle()
        };
        if idle {
            self.signal.finish();
        }
    }

    fn terminate(&self) {
        if !self.accumulator.halt() {
            return;
        }
        let running: Vec<_> = self
            .in_flight
            .lock()
            .running
            .drain()
            .filter_map(|(_, lifecycle)| lifecycle)
            .collect();
        tracing::debug!(
            label = ?self.label,
            kind = "feedback",
            in_flight = running.len(),
            "spin.fold.halted"
        );
        for lifecycle in running {
            lifecycle.cancel();
        }
    }
}
