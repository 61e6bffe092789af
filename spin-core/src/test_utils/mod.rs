//! In-process implementations for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! streams and executers that prove the protocols are usable end to end,
//! plus a [`Recorder`] for asserting on delivered values.

mod immediate_executer;
mod iter_stream;
mod recorder;
mod subject;
mod tokio_executer;

pub use immediate_executer::ImmediateExecuter;
pub use iter_stream::IterStream;
pub use recorder::Recorder;
pub use subject::{Subject, SubjectHandle, channel};
pub use tokio_executer::TokioExecuter;
