//! The Command protocol — the unit of effect in the loop.

use crate::erased::AnyCommand;
use crate::stream::ReactiveStream;
use std::marker::PhantomData;

/// Maps a state snapshot to a stream of mutations.
///
/// `execute` must be referentially transparent with respect to the state:
/// the same snapshot yields an equivalent stream. The returned stream may
/// still do impure work (I/O, timers) once it is subscribed; building it
/// must not.
///
/// The mutation type of the returned stream is tied to
/// [`Command::Mutation`] at the type level, so a reducer can never receive
/// values of the wrong type.
pub trait Command: Send + Sync + 'static {
    /// The snapshot the command reads.
    type State: Clone + Send + 'static;
    /// The values emitted by the effect stream.
    type Mutation: Send + 'static;
    /// The effect stream.
    type Stream: ReactiveStream<Value = Self::Mutation>;

    /// Build the effect stream for `state`.
    fn execute(&self, state: &Self::State) -> Self::Stream;

    /// Erase the concrete type of this command.
    fn erase_to_any_command(
        self,
    ) -> AnyCommand<
        Self::State,
        Self::Mutation,
        <Self::Stream as ReactiveStream>::Executer,
        <Self::Stream as ReactiveStream>::Lifecycle,
    >
    where
        Self: Sized,
    {
        AnyCommand::new(self)
    }
}

/// A [`Command`] backed by a closure. Built with [`command_fn`].
pub struct FnCommand<S, St, F> {
    execute: F,
    _marker: PhantomData<fn(&S) -> St>,
}

/// Turn a closure `Fn(&State) -> Stream` into a [`Command`].
pub fn command_fn<S, St, F>(execute: F) -> FnCommand<S, St, F>
where
    F: Fn(&S) -> St + Send + Sync + 'static,
{
    FnCommand {
        execute,
        _marker: PhantomData,
    }
}

impl<S, St, F> Command for FnCommand<S, St, F>
where
    S: Clone + Send + 'static,
    St: ReactiveStream,
    F: Fn(&S) -> St + Send + Sync + 'static,
{
    type State = S;
    type Mutation = St::Value;
    type Stream = St;

    fn execute(&self, state: &S) -> St {
        (self.execute)(state)
    }
}

impl<S, St, F: Clone> Clone for FnCommand<S, St, F> {
    fn clone(&self) -> Self {
        Self {
            execute: self.execute.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, St, F> std::fmt::Debug for FnCommand<S, St, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCommand").finish_non_exhaustive()
    }
}
