//! TokioExecuter — a serial queue drained by a tokio task.

use crate::executer::{Executer, Job};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Executer that runs jobs one at a time, in scheduling order, on a task
/// spawned on a tokio runtime.
///
/// Clones feed the same queue. The drain task ends once every clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct TokioExecuter {
    queue: mpsc::UnboundedSender<Job>,
}

impl TokioExecuter {
    /// Spawn the drain task on `handle`.
    pub fn new(handle: &Handle) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        handle.spawn(async move {
            while let Some(job) = jobs.recv().await {
                job();
            }
        });
        Self { queue }
    }

    /// Spawn the drain task on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(&Handle::current())
    }
}

impl Executer for TokioExecuter {
    fn execute(&self, job: Job) {
        if self.queue.send(job).is_err() {
            tracing::warn!("spin.executer.closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn jobs_run_in_scheduling_order() {
        let executer = TokioExecuter::current();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (done, finished) = tokio::sync::oneshot::channel();

        for i in 0..5 {
            let log = Arc::clone(&order);
            executer.execute(Box::new(move || log.lock().push(i)));
        }
        executer.execute(Box::new(move || {
            let _ = done.send(());
        }));

        finished.await.unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }
}
