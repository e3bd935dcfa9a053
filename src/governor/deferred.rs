//! The deferred scheduling policy and its pump.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use super::{Bounce, Entry, Governor};
use crate::control::Trampoline;
use crate::error::Outcome;

/// How a [`DeferredGovernor`] stores calls waiting for the pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PendingPolicy {
    /// Every call is queued and pumped in arrival order.
    #[default]
    Fifo,
    /// Only the most recent call is kept; a new call overwrites the pending
    /// one. Suitable only when a single run uses the governor.
    SingleSlot,
}

/// Parks every re-entry and every unit until the owner pumps it.
///
/// A deferred governor bounds recursion even for purely synchronous chains:
/// each [`pump`](Self::pump) runs exactly one parked call, which in turn may
/// park the next one. The owning event-processing context decides when to
/// pump and can interleave its own work between calls.
///
/// # Examples
///
/// ```rust
/// use kiter::engine::Engine;
///
/// let engine = Engine::deferred();
/// let visited = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
/// let record = std::rc::Rc::clone(&visited);
///
/// engine
///     .foreach(
///         vec![1, 2, 3],
///         move |item, advance, _finish| {
///             record.borrow_mut().push(item);
///             advance.proceed()
///         },
///         || {},
///     )
///     .unwrap();
///
/// // The first step runs on the call, the rest wait for the pump.
/// assert_eq!(*visited.borrow(), vec![1]);
/// engine.drain().unwrap();
/// assert_eq!(*visited.borrow(), vec![1, 2, 3]);
/// ```
pub struct DeferredGovernor {
    queue: RefCell<VecDeque<Bounce>>,
    policy: PendingPolicy,
    pumped: Cell<u64>,
}

impl DeferredGovernor {
    /// Creates a FIFO deferred governor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(PendingPolicy::Fifo)
    }

    /// Creates a deferred governor with the given pending policy.
    #[must_use]
    pub fn with_policy(policy: PendingPolicy) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            policy,
            pumped: Cell::new(0),
        }
    }

    /// Returns the pending policy.
    #[inline]
    pub const fn policy(&self) -> PendingPolicy {
        self.policy
    }

    /// Returns the number of parked calls.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if no call is parked.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns the number of calls run by the pump so far.
    #[inline]
    pub fn pumped(&self) -> u64 {
        self.pumped.get()
    }

    /// Runs the oldest parked call, if any.
    ///
    /// Returns `None` when nothing was parked, otherwise the outcome of the
    /// call. Calls parked while this one runs wait for a later pump.
    pub fn pump(&self) -> Option<Outcome> {
        let bounce = self.queue.borrow_mut().pop_front()?;
        self.pumped.set(self.pumped.get() + 1);
        Some(bounce.run())
    }

    /// Pumps until no call is parked.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first failed call. Calls parked behind it
    /// stay parked.
    pub fn drain(&self) -> Outcome {
        while let Some(outcome) = self.pump() {
            outcome?;
        }
        Ok(())
    }

    fn park(&self, bounce: Bounce) {
        let mut queue = self.queue.borrow_mut();
        if self.policy == PendingPolicy::SingleSlot && !queue.is_empty() {
            tracing::debug!(
                overwritten = queue.len(),
                "single-slot governor overwriting pending call"
            );
            queue.clear();
        }
        queue.push_back(bounce);
    }
}

impl Default for DeferredGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeferredGovernor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DeferredGovernor")
            .field("policy", &self.policy)
            .field("pending", &self.pending())
            .field("pumped", &self.pumped.get())
            .finish()
    }
}

impl Governor for DeferredGovernor {
    fn again(&self, bounce: Bounce) -> Bounce {
        self.park(bounce);
        Trampoline::done(Ok(()))
    }

    fn enter(&self, entry: Entry) -> Outcome {
        self.park(Trampoline::suspend(move || Trampoline::done(entry())));
        Ok(())
    }
    #[inline]
    fn holds_pending(&self) -> bool {
        true
    }
}
