//! Subject — a hot stream fed by hand through a [`SubjectHandle`].

use super::ImmediateExecuter;
use crate::error::StreamError;
use crate::executer::Executer;
use crate::lifecycle::{CompletionSignal, Lifecycle};
use crate::producer::Producer;
use crate::stream::{Observer, ReactiveStream};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;

struct Shared<V> {
    buffer: Vec<V>,
    observer: Option<Observer<V>>,
}

/// Create a connected handle and stream.
///
/// Values sent before the stream is subscribed are buffered and delivered,
/// in order, on subscription. Values sent after the stream completed are
/// dropped.
pub fn channel<V, E>() -> (SubjectHandle<V>, Subject<V, E>) {
    let shared = Arc::new(Mutex::new(Shared {
        buffer: Vec::new(),
        observer: None,
    }));
    let signal = CompletionSignal::new();
    (
        SubjectHandle {
            shared: Arc::clone(&shared),
            signal: signal.clone(),
        },
        Subject {
            shared,
            signal,
            _executer: PhantomData,
        },
    )
}

/// The sending half of a [`channel`].
pub struct SubjectHandle<V> {
    shared: Arc<Mutex<Shared<V>>>,
    signal: CompletionSignal,
}

impl<V> SubjectHandle<V> {
    /// Emit `value`. Returns `false` if the stream already completed.
    pub fn send(&self, value: V) -> bool {
        if self.signal.is_completed() {
            return false;
        }
        let observer = {
            let mut shared = self.shared.lock();
            match &shared.observer {
                Some(observer) => observer.clone(),
                None => {
                    shared.buffer.push(value);
                    return true;
                }
            }
        };
        observer.next(value);
        true
    }

    /// Complete the stream normally.
    pub fn finish(&self) -> bool {
        self.signal.finish()
    }

    /// Complete the stream with an upstream failure.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.signal.fail(StreamError::Upstream(message.into()))
    }

    /// True once the stream finished, failed or was cancelled.
    pub fn is_closed(&self) -> bool {
        self.signal.is_completed()
    }

    /// The lifecycle the stream returns on subscription.
    pub fn lifecycle(&self) -> CompletionSignal {
        self.signal.clone()
    }
}

impl<V> Clone for SubjectHandle<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            signal: self.signal.clone(),
        }
    }
}

impl<V> std::fmt::Debug for SubjectHandle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectHandle")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

/// The stream half of a [`channel`]. Subscribe it once.
pub struct Subject<V, E = ImmediateExecuter> {
    shared: Arc<Mutex<Shared<V>>>,
    signal: CompletionSignal,
    _executer: PhantomData<fn() -> E>,
}

impl<V, E> ReactiveStream for Subject<V, E>
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
        // Flush the buffer before attaching, so values sent meanwhile queue
        // up behind it.
        loop {
            let pending = {
                let mut shared = self.shared.lock();
                if shared.buffer.is_empty() {
                    shared.observer = Some(observer.clone());
                    break;
                }
                std::mem::take(&mut shared.buffer)
            };
            for value in pending {
                observer.next(value);
            }
        }

        let shared = Arc::clone(&self.shared);
        self.signal.on_teardown(move || {
            let mut shared = shared.lock();
            shared.observer = None;
            shared.buffer.clear();
        });
        self.signal
    }
}

impl<V, E> Producer for Subject<V, E>
where
    V: Send + 'static,
    E: Executer,
{
}

impl<V, E> std::fmt::Debug for Subject<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}
