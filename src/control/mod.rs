//! The loop core: a bounce data type and the driver built on it.
//!
//! - [`Trampoline`]: stack-safe re-entry encoded as data
//! - [`Proceed`] / [`Finish`]: the two continuations a loop step receives
//!
//! Loops are started through [`Engine::run`](crate::engine::Engine::run) and
//! [`Engine::iterate`](crate::engine::Engine::iterate).
//!
//! # Examples
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kiter::engine::Engine;
//!
//! let total = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&total);
//!
//! Engine::new()
//!     .iterate(
//!         (0_u64, 0_u64),
//!         |(index, sum), proceed, finish| {
//!             if index == 100_000 {
//!                 finish.finish(sum)
//!             } else {
//!                 proceed.next((index + 1, sum + index))
//!             }
//!         },
//!         move |sum| sink.set(sum),
//!     )
//!     .unwrap();
//!
//! assert_eq!(total.get(), 4_999_950_000);
//! ```

mod loop_run;
mod trampoline;

pub(crate) use loop_run::start;
pub use loop_run::{DoneFn, Finish, Proceed, StepFn};
pub use trampoline::Trampoline;
