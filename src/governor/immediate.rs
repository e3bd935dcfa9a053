//! The immediate scheduling policy.

use super::{Bounce, Entry, Governor};
use crate::error::Outcome;

/// Runs every re-entry and every unit synchronously.
///
/// Re-entries are handed straight back to the caller's trampoline, so a long
/// chain of synchronous steps runs in constant stack space.
///
/// # Examples
///
/// ```rust
/// use kiter::control::Trampoline;
/// use kiter::governor::{Governor, ImmediateGovernor};
///
/// let governor = ImmediateGovernor;
/// let bounce = governor.again(Trampoline::suspend(|| Trampoline::done(Ok(()))));
/// assert!(!bounce.is_done());
/// assert!(bounce.run().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImmediateGovernor;

impl Governor for ImmediateGovernor {
    #[inline]
    fn again(&self, bounce: Bounce) -> Bounce {
        bounce
    }

    #[inline]
    fn enter(&self, entry: Entry) -> Outcome {
        entry()
    }
}
