//! ImmediateExecuter — runs every job inline on the calling thread.

use crate::executer::{Executer, Job};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Executer that runs each job synchronously, as soon as it is scheduled.
///
/// Clones share a counter of dispatched jobs.
#[derive(Debug, Clone, Default)]
pub struct ImmediateExecuter {
    dispatched: Arc<AtomicUsize>,
}

impl ImmediateExecuter {
    /// Create a new executer with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs run so far, across all clones.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }
}

impl Executer for ImmediateExecuter {
    fn execute(&self, job: Job) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        job();
    }
}
