//! The Consumer protocol — the terminal stage of a chain.

use crate::erased::AnyConsumer;
use crate::executer::Executer;
use crate::lifecycle::Lifecycle;
use crate::stream::{Observer, ReactiveStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared value callback registered on a consumer.
pub type Sink<V> = Arc<dyn Fn(V) + Send + Sync>;

/// A terminal stage: dispatches values to sinks and starts the chain.
pub trait Consumer: Sized + Send + 'static {
    /// The type of the delivered values.
    type Value: Send + 'static;
    /// Where sinks are dispatched.
    type Executer: Executer;
    /// The handle returned by [`spin`](Consumer::spin).
    type Lifecycle: Lifecycle;

    /// Register `by` to receive every value, dispatched through `on`.
    ///
    /// Returns an equivalent consumer so further sinks can be chained.
    fn consume<F>(
        self,
        by: F,
        on: Self::Executer,
    ) -> AnyConsumer<Self::Value, Self::Executer, Self::Lifecycle>
    where
        F: Fn(Self::Value) + Send + Sync + 'static;

    /// Start the chain and return the handle on the run.
    ///
    /// This is the only point where a chain begins producing side effects.
    /// It consumes the consumer, so a chain is activated at most once.
    fn spin(self) -> Self::Lifecycle;

    /// Erase the concrete type of this consumer.
    fn erase_to_any_consumer(self) -> AnyConsumer<Self::Value, Self::Executer, Self::Lifecycle> {
        AnyConsumer::wrap(self)
    }
}

/// The consumer over a stream: a list of sinks waiting for [`spin`].
///
/// Each value is handed to every sink, in registration order, as one job
/// per sink on the sink's executer. Once the run is cancelled, values not
/// yet delivered are dropped, including jobs already queued on an
/// executer.
///
/// [`spin`]: Consumer::spin
pub struct Consumable<S: ReactiveStream> {
    upstream: S,
    sinks: Vec<(Sink<S::Value>, S::Executer)>,
}

impl<S: ReactiveStream> Consumable<S> {
    /// Wrap a stream with no sinks.
    pub fn new(upstream: S) -> Self {
        Self {
            upstream,
            sinks: Vec::new(),
        }
    }
}

impl<S> Consumer for Consumable<S>
where
    S: ReactiveStream,
    S::Value: Clone,
{
    type Value = S::Value;
    type Executer = S::Executer;
    type Lifecycle = S::Lifecycle;

    fn consume<F>(
        mut self,
        by: F,
        on: S::Executer,
    ) -> AnyConsumer<S::Value, S::Executer, S::Lifecycle>
    where
        F: Fn(S::Value) + Send + Sync + 'static,
    {
        let sink: Sink<S::Value> = Arc::new(by);
        self.sinks.push((sink, on));
        self.erase_to_any_consumer()
    }

    fn spin(self) -> S::Lifecycle {
        let Self { upstream, sinks } = self;
        tracing::debug!(sinks = sinks.len(), "spin.consumer.spin");

        let cancelled = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&cancelled);
        let sinks = Arc::new(sinks);

        let lifecycle = upstream.subscribe(Observer::new(move |value: S::Value| {
            if gate.load(Ordering::Acquire) {
                return;
            }
            for (sink, executer) in sinks.iter() {
                let sink = Arc::clone(sink);
                let gate = Arc::clone(&gate);
                let value = value.clone();
                executer.execute(Box::new(move || {
                    if !gate.load(Ordering::Acquire) {
                        sink(value);
                    }
                }));
            }
        }));

        lifecycle.after_completion(move |outcome| {
            if outcome.is_cancelled() {
                cancelled.store(true, Ordering::Release);
            }
        });
        lifecycle
    }
}

impl<S: ReactiveStream> std::fmt::Debug for Consumable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumable")
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}
