//! Recorder — collects the values delivered to a sink.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

struct Inner<V> {
    values: Mutex<Vec<V>>,
    notify: Notify,
}

/// A shared, append-only log of delivered values.
///
/// Clones share the log. Use [`sink`](Recorder::sink) as the callback of
/// [`Consumer::consume`](crate::Consumer::consume).
pub struct Recorder<V> {
    inner: Arc<Inner<V>>,
}

impl<V: Send + 'static> Recorder<V> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                values: Mutex::new(Vec::new()),
                notify: Notify::new(),
            }),
        }
    }

    /// Append `value` and wake pending [`wait_for`](Recorder::wait_for) calls.
    pub fn record(&self, value: V) {
        self.inner.values.lock().push(value);
        self.inner.notify.notify_waiters();
    }

    /// A sink appending to this recorder.
    pub fn sink(&self) -> impl Fn(V) + Send + Sync + 'static {
        let recorder = self.clone();
        move |value| recorder.record(value)
    }

    /// Number of values recorded so far.
    pub fn len(&self) -> usize {
        self.inner.values.lock().len()
    }

    /// True if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve once at least `count` values were recorded.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.len() >= count {
                return;
            }
            notified.await;
        }
    }
}

impl<V: Clone> Recorder<V> {
    /// A copy of the values recorded so far, in delivery order.
    pub fn values(&self) -> Vec<V> {
        self.inner.values.lock().clone()
    }

    /// The most recent value, if any.
    pub fn last(&self) -> Option<V> {
        self.inner.values.lock().last().cloned()
    }
}

impl<V: Send + 'static> Default for Recorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Recorder<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for Recorder<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("len", &self.inner.values.lock().len())
            .finish()
    }
}
