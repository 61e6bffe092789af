//! IterStream — a cold stream over a fixed list of values.

use super::ImmediateExecuter;
use crate::error::StreamError;
use crate::executer::Executer;
use crate::lifecycle::CompletionSignal;
use crate::producer::Producer;
use crate::stream::{Observer, ReactiveStream};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Emits its values synchronously on subscription, then completes.
///
/// Completes with [`Completion::Finished`](crate::Completion::Finished), or
/// with a failure when built with [`failing`](IterStream::failing). The
/// executer type only tags the stream; pick it with
/// [`on_executer`](IterStream::on_executer).
pub struct IterStream<V, E = ImmediateExecuter> {
    values: Vec<V>,
    failure: Option<String>,
    subscriptions: Arc<AtomicUsize>,
    _executer: PhantomData<fn() -> E>,
}

impl<V> IterStream<V> {
    /// A stream emitting `values` in order, then finishing.
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            values: values.into_iter().collect(),
            failure: None,
            subscriptions: Arc::new(AtomicUsize::new(0)),
            _executer: PhantomData,
        }
    }

    /// A stream emitting `values` in order, then failing with `message`.
    pub fn failing(values: impl IntoIterator<Item = V>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(values)
        }
    }
}

impl<V, E> IterStream<V, E> {
    /// Retag the stream with another executer type.
    pub fn on_executer<E2>(self) -> IterStream<V, E2> {
        IterStream {
            values: self.values,
            failure: self.failure,
            subscriptions: self.subscriptions,
            _executer: PhantomData,
        }
    }

    /// Counter of subscriptions, shared with the stream.
    pub fn subscriptions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.subscriptions)
    }
}

impl<V, E> ReactiveStream for IterStream<V, E>
where
    V: Send + 'static,
    E: Executer,
{
    type Value = V;
    type Executer = E;
    type Lifecycle = CompletionSignal;
    type Input = Self;

    fn to_reactive_stream(self) -> Self {
        self
    }

    fn subscribe(self, observer: Observer<V>) -> CompletionSignal {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let signal = CompletionSignal::new();
        for value in self.values {
            if signal.is_completed() {
                break;
            }
            observer.next(value);
        }
        match self.failure {
            Some(message) => signal.fail(StreamError::Upstream(message)),
            None => signal.finish(),
        };
        signal
    }
}

impl<V, E> Producer for IterStream<V, E>
where
    V: Send + 'static,
    E: Executer,
{
}

impl<V, E> std::fmt::Debug for IterStream<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterStream")
            .field("values", &self.values.len())
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}
