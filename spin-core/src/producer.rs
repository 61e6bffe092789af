//! The Producer protocol — composing, observing and folding a stream.

use crate::command::Command;
use crate::config::FoldOptions;
use crate::consumer::{Consumable, Consumer};
use crate::erased::{AnyConsumer, AnyProducer};
use crate::fold::{Feedback, Scan};
use crate::lifecycle::CompletionSignal;
use crate::stream::{Observer, ReactiveStream};
use std::sync::Arc;

/// A composable source stage.
///
/// Every operation consumes `self` and returns a new stage; no operation
/// starts the stream. Work begins only when the terminal consumer is
/// spun, which subscribes the whole chain exactly once.
///
/// All operations are provided on top of [`ReactiveStream::subscribe`].
/// A stream opts in with an empty impl:
///
/// ```ignore
/// impl Producer for MyStream {}
/// ```
///
/// Implementations may override an operation for efficiency, but must keep
/// its observable behavior; erased producers rely on the provided
/// definitions.
pub trait Producer: ReactiveStream {
    /// Start a chain from a stream built by `function`.
    ///
    /// `function` runs when the chain is subscribed, not when `from` is
    /// called.
    fn from<F>(function: F) -> AnyProducer<Self::Value, Self::Executer, Self::Lifecycle>
    where
        F: FnOnce() -> Self::Input + Send + 'static,
    {
        AnyProducer::new(move |observer| function().subscribe(observer))
    }

    /// Transform the upstream stream with `function`.
    ///
    /// `function` runs exactly once, when the composed stream is
    /// subscribed.
    fn compose<O, F>(self, function: F) -> AnyProducer<O::Value, O::Executer, O::Lifecycle>
    where
        O: ReactiveStream,
        F: FnOnce(Self::Input) -> O + Send + 'static,
    {
        AnyProducer::new(move |observer| function(self.to_reactive_stream()).subscribe(observer))
    }

    /// Observe every value without altering it.
    ///
    /// `function` runs once per value, before the value moves downstream.
    fn spy<F>(self, function: F) -> AnyProducer<Self::Value, Self::Executer, Self::Lifecycle>
    where
        F: Fn(&Self::Value) + Send + Sync + 'static,
    {
        AnyProducer::new(move |observer: Observer<Self::Value>| {
            self.subscribe(Observer::new(move |value| {
                function(&value);
                observer.next(value);
            }))
        })
    }

    /// Fold every value into an accumulator starting from `initial`.
    ///
    /// The resulting consumer emits the accumulator after each step; the
    /// initial value itself is not emitted. `reducer` runs exactly once per
    /// value, in emission order, never concurrently with itself.
    fn scan<R, F>(
        self,
        initial: R,
        reducer: F,
    ) -> AnyConsumer<R, Self::Executer, Self::Lifecycle>
    where
        R: Clone + Send + 'static,
        F: Fn(R, Self::Value) -> R + Send + Sync + 'static,
    {
        self.scan_with(initial, reducer, FoldOptions::default())
    }

    /// [`scan`](Producer::scan) with middleware and a tracing label.
    ///
    /// Middlewares run in declaration order before `reducer` for each
    /// value. They never change the accumulation.
    fn scan_with<R, F>(
        self,
        initial: R,
        reducer: F,
        options: FoldOptions<R, Self::Value>,
    ) -> AnyConsumer<R, Self::Executer, Self::Lifecycle>
    where
        R: Clone + Send + 'static,
        F: Fn(R, Self::Value) -> R + Send + Sync + 'static,
    {
        Consumable::new(Scan::new(self, initial, Arc::new(reducer), options))
            .erase_to_any_consumer()
    }

    /// Run the feedback loop over a stream of commands.
    ///
    /// Each command is executed against the current state; every mutation
    /// of the resulting stream is folded with `reducer` into the next state.
    /// The consumer emits each new state.
    ///
    /// The loop has its own lifecycle. It finishes once the upstream and
    /// every in-flight command stream have finished. Cancelling it stops
    /// the upstream, the running command streams and the sinks, even after
    /// the upstream itself finished.
    fn feedback<F>(
        self,
        initial: <Self::Value as Command>::State,
        reducer: F,
    ) -> AnyConsumer<<Self::Value as Command>::State, Self::Executer, CompletionSignal>
    where
        Self::Value: Command,
        F: Fn(
                <Self::Value as Command>::State,
                <Self::Value as Command>::Mutation,
            ) -> <Self::Value as Command>::State
            + Send
            + Sync
            + 'static,
    {
        self.feedback_with(initial, reducer, FoldOptions::default())
    }

    /// [`feedback`](Producer::feedback) with middleware and a tracing label.
    fn feedback_with<F>(
        self,
        initial: <Self::Value as Command>::State,
        reducer: F,
        options: FoldOptions<<Self::Value as Command>::State, <Self::Value as Command>::Mutation>,
    ) -> AnyConsumer<<Self::Value as Command>::State, Self::Executer, CompletionSignal>
    where
        Self::Value: Command,
        F: Fn(
                <Self::Value as Command>::State,
                <Self::Value as Command>::Mutation,
            ) -> <Self::Value as Command>::State
            + Send
            + Sync
            + 'static,
    {
        Consumable::new(Feedback::new(self, initial, Arc::new(reducer), options))
            .erase_to_any_consumer()
    }

    /// Erase the concrete type of this producer.
    fn erase_to_any_producer(self) -> AnyProducer<Self::Value, Self::Executer, Self::Lifecycle> {
        AnyProducer::wrap(self)
    }
}

/// Entry point for building a loop from any stream.
///
/// ```ignore
/// let lifecycle = Spinner::from(move || commands)
///     .feedback(State::default(), reduce)
///     .consume(render, executer)
///     .spin();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Spinner;

impl Spinner {
    /// Start a chain from the stream built by `function`.
    ///
    /// `function` runs when the chain is subscribed.
    pub fn from<S, F>(function: F) -> AnyProducer<S::Value, S::Executer, S::Lifecycle>
    where
        S: ReactiveStream,
        F: FnOnce() -> S + Send + 'static,
    {
        AnyProducer::new(move |observer| function().subscribe(observer))
    }
}
