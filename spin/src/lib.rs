#![deny(missing_docs)]
//! # spin — umbrella crate
//!
//! Provides a single import surface for building unidirectional feedback
//! loops. Re-exports the protocol crate, plus a `prelude` for the happy
//! path.
//!
//! ```ignore
//! use spin::prelude::*;
//!
//! let lifecycle = Spinner::from(move || commands)
//!     .feedback(State::default(), reduce)
//!     .consume(render, executer)
//!     .spin();
//! ```

pub use spin_core;

pub use spin_core::{
    AnyCommand, AnyConsumer, AnyProducer, Command, Completion, CompletionSignal, Consumer,
    Executer, FoldOptions, Lifecycle, Observer, Producer, ReactiveStream, Spinner, StreamError,
    command_fn,
};

#[cfg(feature = "test-utils")]
pub use spin_core::test_utils;

/// Happy-path imports for composing feedback loops.
pub mod prelude {
    pub use spin_core::{
        AnyCommand, AnyConsumer, AnyProducer, Command, Completion, Consumer, Executer,
        FoldOptions, Lifecycle, Producer, ReactiveStream, Spinner, command_fn,
    };
}
