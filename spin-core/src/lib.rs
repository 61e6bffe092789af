//! # spin-core — Protocol traits for unidirectional feedback loops
//!
//! This crate defines the stages a feedback loop is built from and the fold
//! engine that turns a stream of commands into an evolving state.
//!
//! ## The Protocols
//!
//! | Protocol | Trait | What it does |
//! |----------|-------|-------------|
//! | ① Stream | [`ReactiveStream`] | Delivers values to an [`Observer`] once subscribed |
//! | ② Producer | [`Producer`] | Composes, observes and folds a stream |
//! | ③ Consumer | [`Consumer`] | Dispatches values to sinks and spins the chain |
//! | ④ Command | [`Command`] | Maps a state snapshot to a stream of mutations |
//!
//! ## The Interfaces
//!
//! | Interface | Types | What it does |
//! |-----------|-------|-------------|
//! | ⑤ Executer | [`Executer`], [`Job`] | Where sink callbacks run |
//! | ⑥ Lifecycle | [`Lifecycle`], [`Completion`], [`CompletionSignal`] | Completion and cancellation of a running chain |
//!
//! ## The Loop
//!
//! ```text
//! Command ──execute(&State)──→ Stream<Mutation> ──reduce──→ State
//!    ↑                                                        │
//!    └──────────────────── next command ──────────────────────┘
//! ```
//!
//! [`Producer::feedback`] wires this loop over any stream of commands. The
//! result is a [`Consumer`]; nothing runs until [`Consumer::spin`] is called,
//! which returns the loop's [`Lifecycle`].
//!
//! ## Erasure
//!
//! [`AnyProducer`], [`AnyConsumer`] and [`AnyCommand`] hide the concrete
//! type of a stage while keeping its associated types. Erasure is
//! transparent: an erased stage behaves exactly as the stage it wraps, and
//! erasing an already-erased stage returns it unchanged.
//!
//! ## Design Principle
//!
//! The crate never spawns threads or tasks. Every scheduling decision is
//! delegated to the collaborator-supplied [`Executer`] and stream types.
//! Concrete streams only have to implement [`ReactiveStream::subscribe`];
//! composition, folding and dispatch are provided on top of it.

#![deny(missing_docs)]

pub mod command;
pub mod config;
pub mod consumer;
pub mod erased;
pub mod error;
pub mod executer;
mod fold;
pub mod lifecycle;
pub mod producer;
pub mod stream;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use command::{Command, FnCommand, command_fn};
pub use config::{FoldOptions, Middleware};
pub use consumer::{Consumable, Consumer, Sink};
pub use erased::{AnyCommand, AnyConsumer, AnyProducer};
pub use error::StreamError;
pub use executer::{Executer, Job};
pub use lifecycle::{Completion, CompletionCallback, CompletionSignal, Lifecycle};
pub use producer::{Producer, Spinner};
pub use stream::{Observer, ReactiveStream};
