//! Stack-safe re-entry via trampolining.
//!
//! A [`Trampoline`] is a loop iteration encoded as data. Instead of a step
//! calling the next step (which grows the stack by one frame per iteration),
//! it returns a [`Trampoline::Suspend`] describing the next step, and
//! [`Trampoline::run`] interprets the chain in a flat loop.
//!
//! Rust does not guarantee tail calls, so this is how the loop driver keeps
//! "re-enter the step" in tail form: an immediate governor hands the bounce
//! back to the caller to be run here, a deferred governor parks it in a queue.
//!
//! # Examples
//!
//! ```rust
//! use kiter::control::Trampoline;
//!
//! fn count_down(n: u64) -> Trampoline<u64> {
//!     if n == 0 {
//!         Trampoline::done(0)
//!     } else {
//!         Trampoline::suspend(move || count_down(n - 1))
//!     }
//! }
//!
//! // This would overflow the stack with plain recursion
//! assert_eq!(count_down(1_000_000).run(), 0);
//! ```

use std::fmt;

/// A computation that is either finished or needs one more bounce.
///
/// # Type Parameters
///
/// * `A` - The type of the final result. Must be `'static` to run, because
///   suspended steps are boxed closures.
pub enum Trampoline<A> {
    /// The computation has completed with value `A`.
    Done(A),
    /// The computation needs another step.
    Suspend(Box<dyn FnOnce() -> Self + 'static>),
}

impl<A> Trampoline<A> {
    /// Creates a completed trampoline with the given value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kiter::control::Trampoline;
    ///
    /// assert_eq!(Trampoline::done(42).run(), 42);
    /// ```
    #[inline]
    pub const fn done(value: A) -> Self {
        Self::Done(value)
    }

    /// Creates a suspended trampoline that continues with `thunk`.
    ///
    /// The thunk is not evaluated until the trampoline is run.
    #[inline]
    pub fn suspend<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Self + 'static,
    {
        Self::Suspend(Box::new(thunk))
    }

    /// Returns `true` if no bounce is left.
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

impl<A: 'static> Trampoline<A> {
    /// Runs the trampoline to completion in constant stack space.
    pub fn run(self) -> A {
        let mut current = self;

        loop {
            match current {
                Self::Done(value) => return value,
                Self::Suspend(thunk) => current = thunk(),
            }
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Trampoline<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(value) => formatter.debug_tuple("Done").field(value).finish(),
            Self::Suspend(_) => formatter.debug_tuple("Suspend").field(&"<thunk>").finish(),
        }
    }
}
