//! # kiter
//!
//! A continuation-driven iteration engine.
//!
//! Loops, folds, traversals and fan-out joins are expressed as steps that
//! signal "go on" or "stop" through continuations. A step may signal before
//! it returns or hold on to the continuation and signal later, from an I/O
//! callback, a timer or another loop. Either way the loop resumes exactly as
//! if it had continued synchronously, and long chains of synchronous steps
//! run in constant stack space.
//!
//! ## Overview
//!
//! - **Loop core** ([`control`]): the trampolined driver and its
//!   [`Proceed`](control::Proceed) / [`Finish`](control::Finish) continuations
//! - **Governors** ([`governor`]): pluggable policies for re-entering a loop,
//!   immediate (trampolined) or deferred (pumped by the owner)
//! - **Engine** ([`engine`]): the call-site handle carrying a governor
//! - **Combinators**: foreach, map, filter, folds, unfold and tree descent
//! - **Join**: fan-out over independent units with a single fan-in point
//!
//! ## Feature Flags
//!
//! - `combinators`: list and tree combinators
//! - `join`: parallel join
//! - `async`: tokio local-task governor and the future bridge
//! - `serde`: (de)serialization of governor policies
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use kiter::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let engine = Engine::new();
//! let squares = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&squares);
//!
//! engine
//!     .map(1..=4, |item, collect| collect.collect([item * item]), move |outputs| {
//!         *sink.borrow_mut() = outputs;
//!     })
//!     .unwrap();
//!
//! assert_eq!(*squares.borrow(), vec![1, 4, 9, 16]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use kiter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::GovernorPolicy;
    pub use crate::control::{Finish, Proceed};
    pub use crate::engine::Engine;
    pub use crate::error::{EngineError, Outcome};
    pub use crate::governor::{DeferredGovernor, Governor, ImmediateGovernor, PendingPolicy};

    #[cfg(feature = "combinators")]
    pub use crate::combinators::*;

    #[cfg(feature = "join")]
    pub use crate::join::{Join, UnitDone};

    #[cfg(feature = "async")]
    pub use crate::governor::LocalTaskGovernor;

    #[cfg(feature = "async")]
    pub use crate::settle::settle;
}

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod governor;

#[cfg(feature = "combinators")]
pub mod combinators;

#[cfg(feature = "join")]
pub mod join;

#[cfg(feature = "async")]
pub mod settle;
