//! The call-site handle that carries a governor.
//!
//! Every combinator in this crate is a method on [`Engine`], so choosing a
//! scheduling policy means choosing which engine to call. `Engine::new()`
//! uses the immediate policy; nothing is kept in global state.

use std::fmt;
use std::rc::Rc;

use crate::config::GovernorPolicy;
use crate::control::{self, Finish, Proceed};
use crate::error::Outcome;
use crate::governor::{DeferredGovernor, ImmediateGovernor, PendingPolicy, SharedGovernor};

/// A handle for starting loops and joins under one governor.
///
/// Cloning an engine shares its governor.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use kiter::engine::Engine;
///
/// let steps = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&steps);
/// let finished = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&finished);
///
/// Engine::new()
///     .run(
///         move |proceed, finish| {
///             counter.set(counter.get() + 1);
///             if counter.get() < 3 { proceed.proceed() } else { finish.finish(()) }
///         },
///         move || flag.set(true),
///     )
///     .unwrap();
///
/// assert_eq!(steps.get(), 3);
/// assert!(finished.get());
/// ```
#[derive(Clone)]
pub struct Engine {
    governor: SharedGovernor,
    deferred: Option<Rc<DeferredGovernor>>,
}

impl Engine {
    /// Creates an engine with the immediate governor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_governor(Rc::new(ImmediateGovernor))
    }

    /// Creates an engine with a FIFO deferred governor that it pumps itself.
    ///
    /// Calls still parked when the engine and all its clones are dropped are
    /// dropped with the governor, and their runs are abandoned.
    #[must_use]
    pub fn deferred() -> Self {
        Self::deferred_with(PendingPolicy::Fifo)
    }

    /// Creates an engine with a deferred governor using `policy`.
    #[must_use]
    pub fn deferred_with(policy: PendingPolicy) -> Self {
        let governor = Rc::new(DeferredGovernor::with_policy(policy));
        Self {
            governor: Rc::clone(&governor) as SharedGovernor,
            deferred: Some(governor),
        }
    }

    /// Creates an engine with a caller-supplied governor.
    ///
    /// The caller stays responsible for pumping it, if it needs pumping.
    #[must_use]
    pub fn with_governor(governor: SharedGovernor) -> Self {
        Self {
            governor,
            deferred: None,
        }
    }

    /// Creates an engine whose governor runs re-entries and join units as
    /// tasks on the current tokio `LocalSet`.
    #[cfg(feature = "async")]
    #[must_use]
    pub fn local() -> Self {
        Self::with_governor(Rc::new(crate::governor::LocalTaskGovernor::new()))
    }

    /// Creates an engine for a configured policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kiter::engine::Engine;
    /// use kiter::config::GovernorPolicy;
    ///
    /// let policy: GovernorPolicy = "deferred".parse().unwrap();
    /// let engine = Engine::from_policy(policy);
    /// assert!(engine.is_deferred());
    /// ```
    #[must_use]
    pub fn from_policy(policy: GovernorPolicy) -> Self {
        match policy {
            GovernorPolicy::Immediate => Self::new(),
            GovernorPolicy::Deferred(pending) => Self::deferred_with(pending),
        }
    }

    /// Returns the governor shared by everything this engine starts.
    #[inline]
    pub const fn governor(&self) -> &SharedGovernor {
        &self.governor
    }

    /// Returns `true` if this engine owns a deferred governor.
    #[inline]
    pub const fn is_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Runs one parked call of the owned deferred governor.
    ///
    /// Returns `None` if nothing is parked or the engine does not own a
    /// deferred governor.
    pub fn pump(&self) -> Option<Outcome> {
        self.deferred.as_ref()?.pump()
    }

    /// Pumps the owned deferred governor until it is idle.
    ///
    /// # Errors
    ///
    /// Returns the first failed call; see [`DeferredGovernor::drain`].
    pub fn drain(&self) -> Outcome {
        self.deferred.as_ref().map_or(Ok(()), |governor| governor.drain())
    }

    /// Returns the number of calls parked on the owned deferred governor.
    pub fn pending(&self) -> usize {
        self.deferred.as_ref().map_or(0, |governor| governor.pending())
    }

    /// Runs a loop whose step carries no state.
    ///
    /// `step` is invoked with a [`Proceed`] and a [`Finish`] continuation and
    /// must signal exactly one of them, now or later. `done` runs once, when
    /// `finish` is signalled.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    pub fn run<F, D>(&self, mut step: F, done: D) -> Outcome
    where
        F: FnMut(Proceed<()>, Finish<()>) -> Outcome + 'static,
        D: FnOnce() + 'static,
    {
        self.iterate((), move |(), proceed, finish| step(proceed, finish), move |()| done())
    }

    /// Runs a loop that threads loop-local state from one step to the next.
    ///
    /// The first step receives `seed`; every later step receives the state
    /// passed to [`Proceed::next`]. `done` receives the value passed to
    /// [`Finish::finish`].
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    pub fn iterate<S, T, F, D>(&self, seed: S, step: F, done: D) -> Outcome
    where
        S: 'static,
        T: 'static,
        F: FnMut(S, Proceed<S>, Finish<T>) -> Outcome + 'static,
        D: FnOnce(T) + 'static,
    {
        control::start(Rc::clone(&self.governor), seed, step, done)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Engine")
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
