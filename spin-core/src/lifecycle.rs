//! The Lifecycle interface — completion and cancellation of a running chain.
//!
//! [`Consumer::spin`](crate::Consumer::spin) returns the lifecycle of the
//! underlying stream. It is the only control surface of a running loop:
//! observers learn how it ended through [`Lifecycle::after_completion`], and
//! callers stop it with [`Lifecycle::cancel`].
//!
//! ## Replay
//!
//! A completion callback fires exactly once. Callbacks registered after the
//! run already ended fire immediately with the recorded outcome, so a
//! caller never has to race the stream to observe its end.
//! [`CompletionSignal`] implements this contract and is meant to be reused
//! by stream implementations.

use crate::error::StreamError;
use parking_lot::Mutex;
use std::sync::Arc;

/// How a running stream ended.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Completion {
    /// The stream produced all of its values.
    Finished,
    /// The stream terminated with an error.
    Failed(Arc<StreamError>),
    /// The lifecycle was cancelled before the stream finished.
    Cancelled,
}

impl Completion {
    /// Build a failed outcome.
    pub fn failed(error: impl Into<StreamError>) -> Self {
        Completion::Failed(Arc::new(error.into()))
    }

    /// True if the stream finished normally.
    pub fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }

    /// True if the stream failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Completion::Failed(_))
    }

    /// True if the lifecycle was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled)
    }

    /// The error carried by a failed outcome.
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            Completion::Failed(error) => Some(&**error),
            _ => None,
        }
    }
}

/// A callback run once a stream reaches a terminal state.
pub type CompletionCallback = Box<dyn FnOnce(Completion) + Send + 'static>;

/// A handle on a running stream.
///
/// Implementations are cheap handles (`Clone`) over shared state: every
/// clone observes and controls the same run.
pub trait Lifecycle: Clone + Send + Sync + 'static {
    /// Run `callback` once the stream finishes, fails or is cancelled.
    ///
    /// Fires exactly once. If the stream already ended, fires immediately.
    fn after_completion<F>(&self, callback: F)
    where
        F: FnOnce(Completion) + Send + 'static;

    /// Stop the stream. Completes with [`Completion::Cancelled`] unless the
    /// stream already ended, in which case this is a no-op.
    fn cancel(&self);
}

#[derive(Default)]
struct SignalState {
    outcome: Option<Completion>,
    callbacks: Vec<CompletionCallback>,
    teardown: Vec<Box<dyn FnOnce() + Send + 'static>>,
}

/// A one-shot completion cell implementing [`Lifecycle`].
///
/// The first outcome recorded wins; later ones are ignored. Teardown hooks
/// run before completion callbacks, outside of the internal lock, so a
/// callback may freely register new callbacks or cancel other signals.
#[derive(Clone, Default)]
pub struct CompletionSignal {
    inner: Arc<Mutex<SignalState>>,
}

impl CompletionSignal {
    /// Create a signal that has not completed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outcome` and fire pending callbacks.
    ///
    /// Returns `false` if the signal had already completed.
    pub fn complete(&self, outcome: Completion) -> bool {
        let (teardown, callbacks) = {
            let mut state = self.inner.lock();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome.clone());
            (
                std::mem::take(&mut state.teardown),
                std::mem::take(&mut state.callbacks),
            )
        };

        for hook in teardown {
            hook();
        }
        for callback in callbacks {
            callback(outcome.clone());
        }
        true
    }

    /// Complete with [`Completion::Finished`].
    pub fn finish(&self) -> bool {
        self.complete(Completion::Finished)
    }

    /// Complete with [`Completion::Failed`].
    pub fn fail(&self, error: StreamError) -> bool {
        self.complete(Completion::failed(error))
    }

    /// The recorded outcome, if the signal completed.
    pub fn outcome(&self) -> Option<Completion> {
        self.inner.lock().outcome.clone()
    }

    /// True once an outcome has been recorded.
    pub fn is_completed(&self) -> bool {
        self.inner.lock().outcome.is_some()
    }

    /// Register a hook releasing the resources of the run.
    ///
    /// Runs once when the signal completes, whatever the outcome. Runs
    /// immediately if it already completed.
    pub fn on_teardown<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.lock();
        if state.outcome.is_some() {
            drop(state);
            hook();
        } else {
            state.teardown.push(Box::new(hook));
        }
    }
}

impl Lifecycle for CompletionSignal {
    fn after_completion<F>(&self, callback: F)
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        let mut state = self.inner.lock();
        match state.outcome.clone() {
            Some(outcome) => {
                drop(state);
                callback(outcome);
            }
            None => state.callbacks.push(Box::new(callback)),
        }
    }

    fn cancel(&self) {
        if self.complete(Completion::Cancelled) {
            tracing::debug!("spin.lifecycle.cancelled");
        }
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("outcome", &self.outcome())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(Completion) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        (count, move |_: Completion| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn callback_registered_before_completion_fires_once() {
        let signal = CompletionSignal::new();
        let (count, callback) = counter();
        signal.after_completion(callback);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert!(signal.finish());
        assert!(!signal.finish());
        signal.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_registered_after_completion_replays_outcome() {
        let signal = CompletionSignal::new();
        signal.fail(StreamError::Upstream("boom".into()));

        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        signal.after_completion(move |outcome| *slot.lock() = Some(outcome));

        let outcome = seen.lock().clone().unwrap();
        assert!(outcome.is_failed());
        assert_eq!(outcome.error().unwrap().to_string(), "upstream failed: boom");
    }

    #[test]
    fn first_outcome_wins() {
        let signal = CompletionSignal::new();
        signal.cancel();
        assert!(!signal.finish());
        assert!(signal.outcome().unwrap().is_cancelled());
    }

    #[test]
    fn teardown_runs_before_callbacks_and_replays() {
        let signal = CompletionSignal::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&order);
        signal.after_completion(move |_| log.lock().push("callback"));
        let log = Arc::clone(&order);
        signal.on_teardown(move || log.lock().push("teardown"));

        signal.cancel();
        let log = Arc::clone(&order);
        signal.on_teardown(move || log.lock().push("late teardown"));

        assert_eq!(*order.lock(), vec!["teardown", "callback", "late teardown"]);
    }

    #[test]
    fn callback_may_register_another_callback() {
        let signal = CompletionSignal::new();
        let (count, inner) = counter();
        let nested = signal.clone();
        signal.after_completion(move |_| nested.after_completion(inner));
        signal.finish();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
