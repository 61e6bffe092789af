//! The Executer interface — where sink callbacks run.

/// A unit of work handed to an [`Executer`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An opaque dispatch destination for sink callbacks.
///
/// The engine never inspects an executer. It hands it one job per delivered
/// value, in emission order. Whether the job runs inline, on a serial queue
/// or on a pool is the implementation's business. Serial implementations
/// preserve delivery order; concurrent ones do not.
pub trait Executer: Clone + Send + Sync + 'static {
    /// Schedule `job` for execution.
    fn execute(&self, job: Job);
}
