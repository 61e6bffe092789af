//! Type-erased stages.
//!
//! Each wrapper hides the concrete type of a stage behind its associated
//! types, so stages built from different stream implementations can be
//! stored side by side and composed interchangeably.
//!
//! - [`AnyProducer`] captures the wrapped stream's `subscribe` in a closure.
//! - [`AnyCommand`] captures the wrapped command's `execute` in a closure.
//! - [`AnyConsumer`] boxes the wrapped consumer behind an object-safe
//!   adapter, since a consumer exposes two consuming operations.
//!
//! Wrapping is transparent: an erased stage behaves exactly like the stage
//! it wraps. Erasing an already-erased stage returns it as is, so repeated
//! erasure never stacks wrappers.

use crate::command::Command;
use crate::consumer::{Consumer, Sink};
use crate::executer::Executer;
use crate::lifecycle::Lifecycle;
use crate::producer::Producer;
use crate::stream::{Observer, ReactiveStream};
use std::marker::PhantomData;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// AnyProducer
// ---------------------------------------------------------------------------

/// A producer of `V` values with its concrete stream type erased.
pub struct AnyProducer<V, E, L> {
    subscribe: Box<dyn FnOnce(Observer<V>) -> L + Send>,
    _executer: PhantomData<fn() -> E>,
}

impl<V, E, L> AnyProducer<V, E, L>
where
    V: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    /// Build a producer from its subscription function.
    ///
    /// `subscribe` runs once, when the producer is subscribed.
    pub fn new<F>(subscribe: F) -> Self
    where
        F: FnOnce(Observer<V>) -> L + Send + 'static,
    {
        Self {
            subscribe: Box::new(subscribe),
            _executer: PhantomData,
        }
    }

    /// Erase a concrete stream.
    pub fn wrap<S>(stream: S) -> Self
    where
        S: ReactiveStream<Value = V, Executer = E, Lifecycle = L>,
    {
        Self::new(move |observer| stream.subscribe(observer))
    }
}

impl<V, E, L> ReactiveStream for AnyProducer<V, E, L>
where
    V: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    type Value = V;
    type Executer = E;
    type Lifecycle = L;
    type Input = Self;

    fn to_reactive_stream(self) -> Self {
        self
    }

    fn subscribe(self, observer: Observer<V>) -> L {
        (self.subscribe)(observer)
    }
}

impl<V, E, L> Producer for AnyProducer<V, E, L>
where
    V: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    fn erase_to_any_producer(self) -> Self {
        self
    }
}

impl<V, E, L> std::fmt::Debug for AnyProducer<V, E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyProducer").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// AnyConsumer
// ---------------------------------------------------------------------------

/// Object-safe view of a [`Consumer`].
trait ErasedConsumer<V, E, L>: Send {
    fn consume_boxed(self: Box<Self>, by: Sink<V>, on: E) -> AnyConsumer<V, E, L>;
    fn spin_boxed(self: Box<Self>) -> L;
}

impl<C: Consumer> ErasedConsumer<C::Value, C::Executer, C::Lifecycle> for C {
    fn consume_boxed(
        self: Box<Self>,
        by: Sink<C::Value>,
        on: C::Executer,
    ) -> AnyConsumer<C::Value, C::Executer, C::Lifecycle> {
        (*self).consume(move |value| by(value), on)
    }

    fn spin_boxed(self: Box<Self>) -> C::Lifecycle {
        (*self).spin()
    }
}

/// A consumer of `V` values with its concrete type erased.
pub struct AnyConsumer<V, E, L> {
    inner: Box<dyn ErasedConsumer<V, E, L>>,
}

impl<V, E, L> AnyConsumer<V, E, L>
where
    V: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    /// Erase a concrete consumer.
    pub fn wrap<C>(consumer: C) -> Self
    where
        C: Consumer<Value = V, Executer = E, Lifecycle = L>,
    {
        Self {
            inner: Box::new(consumer),
        }
    }
}

impl<V, E, L> Consumer for AnyConsumer<V, E, L>
where
    V: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    type Value = V;
    type Executer = E;
    type Lifecycle = L;

    fn consume<F>(self, by: F, on: E) -> AnyConsumer<V, E, L>
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        let by: Sink<V> = Arc::new(by);
        self.inner.consume_boxed(by, on)
    }

    fn spin(self) -> L {
        self.inner.spin_boxed()
    }

    fn erase_to_any_consumer(self) -> Self {
        self
    }
}

impl<V, E, L> std::fmt::Debug for AnyConsumer<V, E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyConsumer").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// AnyCommand
// ---------------------------------------------------------------------------

/// A command mapping `S` snapshots to streams of `M` mutations, with its
/// concrete type erased.
///
/// Clones share the wrapped command.
pub struct AnyCommand<S, M, E, L> {
    execute: Arc<dyn Fn(&S) -> AnyProducer<M, E, L> + Send + Sync>,
}

impl<S, M, E, L> AnyCommand<S, M, E, L>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    /// Erase a concrete command.
    pub fn new<C>(command: C) -> Self
    where
        C: Command<State = S, Mutation = M>,
        C::Stream: ReactiveStream<Executer = E, Lifecycle = L>,
    {
        Self {
            execute: Arc::new(move |state: &S| AnyProducer::wrap(command.execute(state))),
        }
    }
}

impl<S, M, E, L> Clone for AnyCommand<S, M, E, L> {
    fn clone(&self) -> Self {
        Self {
            execute: Arc::clone(&self.execute),
        }
    }
}

impl<S, M, E, L> Command for AnyCommand<S, M, E, L>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
    E: Executer,
    L: Lifecycle,
{
    type State = S;
    type Mutation = M;
    type Stream = AnyProducer<M, E, L>;

    fn execute(&self, state: &S) -> AnyProducer<M, E, L> {
        (self.execute)(state)
    }

    fn erase_to_any_command(self) -> Self {
        self
    }
}

impl<S, M, E, L> std::fmt::Debug for AnyCommand<S, M, E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyCommand").finish_non_exhaustive()
    }
}
