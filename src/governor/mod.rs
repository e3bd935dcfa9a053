//! Scheduling policies for re-entering loops and starting join units.
//!
//! A [`Governor`] decides *how* the next iteration of a loop is run, never
//! *what* it does. Separating the two lets a caller trade stack safety by
//! trampolining ([`ImmediateGovernor`]) against explicit interleaving with
//! other event-loop work ([`DeferredGovernor`], or the tokio-backed
//! `LocalTaskGovernor` with the `async` feature) without touching any
//! combinator.
//!
//! # Examples
//!
//! ```rust
//! use std::rc::Rc;
//! use kiter::governor::{DeferredGovernor, Governor};
//! use kiter::control::Trampoline;
//!
//! let governor = Rc::new(DeferredGovernor::new());
//! let remaining = governor.again(Trampoline::suspend(|| Trampoline::done(Ok(()))));
//!
//! // The call was parked, nothing is left for the caller to run.
//! assert!(remaining.is_done());
//! assert_eq!(governor.pending(), 1);
//! assert!(governor.drain().is_ok());
//! assert!(governor.is_idle());
//! ```

mod deferred;
mod immediate;
#[cfg(feature = "async")]
mod local;

pub use deferred::{DeferredGovernor, PendingPolicy};
pub use immediate::ImmediateGovernor;
#[cfg(feature = "async")]
pub use local::LocalTaskGovernor;

use std::rc::Rc;

use crate::control::Trampoline;
use crate::error::Outcome;

/// One pending re-entry: a trampoline whose final value is the outcome of
/// the steps it ran.
pub type Bounce = Trampoline<Outcome>;

/// A unit of work started under governance, already bound to its own
/// completion continuation.
pub type Entry = Box<dyn FnOnce() -> Outcome + 'static>;

/// A governor shared between the runs it schedules and whoever owns it.
pub type SharedGovernor = Rc<dyn Governor>;

/// A scheduling policy.
///
/// Governors are single-threaded: they are shared through `Rc` and every
/// call happens on the thread that owns the loops they drive.
pub trait Governor {
    /// Arranges for `bounce` to run under this policy.
    ///
    /// Returns whatever the caller must run right now. A policy that runs
    /// re-entries in place returns `bounce` itself, so the caller's
    /// trampoline executes it without an extra stack frame. A policy that
    /// postpones re-entries stores `bounce` and returns a finished
    /// trampoline.
    fn again(&self, bounce: Bounce) -> Bounce;

    /// Starts a concurrent unit of work under this policy.
    ///
    /// `entry` signals its own completion through the continuation it
    /// captured. The returned outcome only covers starting the unit.
    ///
    /// # Errors
    ///
    /// Returns the error of an entry that ran synchronously and failed.
    fn enter(&self, entry: Entry) -> Outcome;

    /// Returns `true` if this governor stores the bounces handed to it
    /// until its owner runs them.
    ///
    /// Runs scheduled by such a governor keep only a weak link to it, and a
    /// run whose governor is gone is abandoned.
    fn holds_pending(&self) -> bool {
        false
    }
}

/// Runs `bounce` under `governor` to the point where control returns to the
/// caller.
///
/// This is the asynchronous resumption path: it is used from outside any
/// step frame, so running the returned trampoline here cannot stack up.
///
/// # Errors
///
/// Returns the first error raised by a step that ran in place.
pub fn dispatch(governor: &dyn Governor, bounce: Bounce) -> Outcome {
    governor.again(bounce).run()
}
