//! The ReactiveStream protocol — the typing anchor every stage implements.

use crate::executer::Executer;
use crate::lifecycle::Lifecycle;
use std::sync::Arc;

/// Receives the values of a subscribed stream.
///
/// Cloning an observer shares the callback. A stream may call [`next`]
/// from any thread; ordering is the stream's emission order.
///
/// [`next`]: Observer::next
pub struct Observer<V> {
    on_next: Arc<dyn Fn(V) + Send + Sync>,
}

impl<V> Observer<V> {
    /// Wrap a value callback.
    pub fn new<F>(on_next: F) -> Self
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        Self {
            on_next: Arc::new(on_next),
        }
    }

    /// Deliver one value.
    pub fn next(&self, value: V) {
        (self.on_next)(value)
    }
}

impl<V> Clone for Observer<V> {
    fn clone(&self) -> Self {
        Self {
            on_next: Arc::clone(&self.on_next),
        }
    }
}

impl<V> std::fmt::Debug for Observer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

/// A lazy, ordered, possibly infinite sequence of values.
///
/// A stream is parameterized by the [`Executer`] its consumers dispatch on
/// and the [`Lifecycle`] it hands back once started. `Input` links a stage
/// to the stream it exposes upstream; it carries the same three associated
/// types, and is usually `Self`.
///
/// Implementations provide [`subscribe`](ReactiveStream::subscribe), the
/// single point where a stream starts doing work. Everything else in the
/// crate is built on top of it.
pub trait ReactiveStream: Sized + Send + 'static {
    /// The type of the emitted values.
    type Value: Send + 'static;
    /// Where consumers of this stream dispatch their sinks.
    type Executer: Executer;
    /// The handle returned once the stream is started.
    type Lifecycle: Lifecycle;
    /// The stream this stage exposes upstream.
    type Input: ReactiveStream<
            Value = Self::Value,
            Executer = Self::Executer,
            Lifecycle = Self::Lifecycle,
        >;

    /// Expose the upstream stream. Has no side effects of its own.
    fn to_reactive_stream(self) -> Self::Input;

    /// Start the stream, delivering every value to `observer` in emission
    /// order, and return the handle on the run.
    fn subscribe(self, observer: Observer<Self::Value>) -> Self::Lifecycle;
}
