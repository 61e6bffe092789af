//! Error types for running streams.
//!
//! Contract violations between stages (a command whose mutation type does
//! not match the reducer) and missing operations are rejected by the type
//! checker, so the only runtime failures are the ones a stream reports
//! through its [`Lifecycle`](crate::Lifecycle).

use thiserror::Error;

/// Why a stream terminated with a failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StreamError {
    /// The upstream source failed.
    #[error("upstream failed: {0}")]
    Upstream(String),

    /// The stream returned by a command failed.
    /// The feedback loop logs it and keeps running.
    #[error("command failed: {0}")]
    Command(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
