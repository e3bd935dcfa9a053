//! The trampoline loop driver.
//!
//! A loop run repeatedly invokes a step function, handing it two
//! continuations: [`Proceed`] (run the step again with new loop-local state)
//! and [`Finish`] (stop and deliver the final value). The step may signal
//! either one before it returns, or keep the continuation and signal later
//! from unrelated code.
//!
//! # Re-entry
//!
//! While the step executes, the run is marked *synchronous*. A `proceed`
//! arriving in that window only records a pending re-entry; once the step
//! returns, the driver hands the next invocation to the governor as a
//! [`Trampoline`] bounce. The immediate governor gives the bounce straight
//! back and the trampoline runs it in the same frame, so a chain of
//! synchronous completions never deepens the stack.
//!
//! A `proceed` arriving after the step returned is an asynchronous
//! resumption. It dispatches the next invocation through the governor from
//! the caller's own frame.
//!
//! # Single-shot contract
//!
//! Every invocation of the step is a numbered *occurrence*. Exactly one of
//! `proceed` or `finish` may be signalled per occurrence; a second signal, a
//! signal from an earlier occurrence, or any signal after the run finished
//! is a [`ProtocolViolation`].
//!
//! # Ownership
//!
//! The run never owns itself. Continuations hold an `Rc` to it, and the step
//! and final continuation live in slots that are emptied when the run
//! finishes. A stalled run is reclaimed when the last continuation into it
//! is dropped.
//!
//! A governor that parks bounces (see [`Governor::holds_pending`]) is only
//! linked weakly, since its queue holds the run. Dropping the last owner of
//! such a governor drops the parked bounces and with them the runs; a
//! continuation that outlives the governor abandons its run.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use static_assertions::assert_not_impl_any;

use super::trampoline::Trampoline;
use crate::error::{EngineError, Outcome, ProtocolViolation, ViolationKind};
use crate::governor::{Bounce, Governor, SharedGovernor, dispatch};

/// A boxed step function: loop-local state in, one signal out.
pub type StepFn<S, T> = Box<dyn FnMut(S, Proceed<S>, Finish<T>) -> Outcome + 'static>;

/// A boxed final continuation.
pub type DoneFn<T> = Box<dyn FnOnce(T) + 'static>;

trait Resume<S> {
    fn resume(self: Rc<Self>, occurrence: u64, state: S) -> Outcome;
}

trait Complete<T> {
    fn complete(self: Rc<Self>, occurrence: u64, value: T) -> Outcome;
}

enum GovernorLink {
    Strong(SharedGovernor),
    Weak(Weak<dyn Governor>),
}

impl GovernorLink {
    fn new(governor: &SharedGovernor) -> Self {
        if governor.holds_pending() {
            Self::Weak(Rc::downgrade(governor))
        } else {
            Self::Strong(Rc::clone(governor))
        }
    }

    fn upgrade(&self) -> Option<SharedGovernor> {
        match self {
            Self::Strong(governor) => Some(Rc::clone(governor)),
            Self::Weak(governor) => governor.upgrade(),
        }
    }
}

struct LoopRun<S, T> {
    governor: GovernorLink,
    step: RefCell<Option<StepFn<S, T>>>,
    done: RefCell<Option<DoneFn<T>>>,
    state: RefCell<Option<S>>,
    synchronous: Cell<bool>,
    pending_reentry: Cell<bool>,
    occurrence: Cell<u64>,
    signalled: Cell<bool>,
    finished: Cell<bool>,
}

/// Starts a loop run with `seed` as the state of its first step.
///
/// The first step runs before this returns; later steps run as the governor
/// allows.
///
/// # Errors
///
/// Returns a protocol violation raised by any step that ran synchronously on
/// this call.
pub(crate) fn start<S, T, F, D>(governor: SharedGovernor, seed: S, step: F, done: D) -> Outcome
where
    S: 'static,
    T: 'static,
    F: FnMut(S, Proceed<S>, Finish<T>) -> Outcome + 'static,
    D: FnOnce(T) + 'static,
{
    let run = Rc::new(LoopRun {
        governor: GovernorLink::new(&governor),
        step: RefCell::new(Some(Box::new(step) as StepFn<S, T>)),
        done: RefCell::new(Some(Box::new(done) as DoneFn<T>)),
        state: RefCell::new(Some(seed)),
        synchronous: Cell::new(false),
        pending_reentry: Cell::new(false),
        occurrence: Cell::new(0),
        signalled: Cell::new(false),
        finished: Cell::new(false),
    });
    tracing::trace!("loop run started");
    run.invoke_step().run()
}

impl<S: 'static, T: 'static> LoopRun<S, T> {
    fn invoke_step(self: Rc<Self>) -> Bounce {
        if self.finished.get() {
            return Trampoline::done(Ok(()));
        }
        let Some(state) = self.state.borrow_mut().take() else {
            return Trampoline::done(Ok(()));
        };
        let Some(mut step) = self.step.borrow_mut().take() else {
            return Trampoline::done(Ok(()));
        };

        let occurrence = self.occurrence.get() + 1;
        self.occurrence.set(occurrence);
        self.signalled.set(false);

        let proceed = Proceed {
            run: Rc::clone(&self) as Rc<dyn Resume<S>>,
            occurrence,
        };
        let finish = Finish {
            run: Rc::clone(&self) as Rc<dyn Complete<T>>,
            occurrence,
        };

        self.synchronous.set(true);
        let outcome = step(state, proceed, finish);
        self.synchronous.set(false);

        if !self.finished.get() {
            *self.step.borrow_mut() = Some(step);
        }

        if let Err(error) = outcome {
            self.pending_reentry.set(false);
            return Trampoline::done(Err(error));
        }

        if self.pending_reentry.replace(false) {
            let Some(governor) = self.governor.upgrade() else {
                return Trampoline::done(self.abandon());
            };
            let run = Rc::clone(&self);
            governor.again(Trampoline::suspend(move || run.invoke_step()))
        } else {
            Trampoline::done(Ok(()))
        }
    }

    fn abandon(&self) -> Outcome {
        self.finished.set(true);
        self.pending_reentry.set(false);

        let state = self.state.borrow_mut().take();
        let step = self.step.borrow_mut().take();
        let done = self.done.borrow_mut().take();
        drop((state, step, done));

        tracing::debug!(
            occurrence = self.occurrence.get(),
            "loop run abandoned: governor dropped"
        );
        Err(EngineError::Abandoned)
    }

    fn claim(&self, signal: &'static str, occurrence: u64) -> Outcome {
        let kind = if self.finished.get() {
            ViolationKind::AlreadyFinished
        } else if occurrence != self.occurrence.get() {
            ViolationKind::StaleOccurrence
        } else if self.signalled.replace(true) {
            ViolationKind::AlreadySignalled
        } else {
            return Ok(());
        };
        tracing::warn!(signal, occurrence, %kind, "loop continuation misused");
        Err(EngineError::ProtocolViolation(ProtocolViolation {
            signal,
            kind,
            occurrence,
        }))
    }
}

impl<S: 'static, T: 'static> Resume<S> for LoopRun<S, T> {
    fn resume(self: Rc<Self>, occurrence: u64, state: S) -> Outcome {
        self.claim("proceed", occurrence)?;
        *self.state.borrow_mut() = Some(state);
        if self.synchronous.get() {
            self.pending_reentry.set(true);
            return Ok(());
        }
        let Some(governor) = self.governor.upgrade() else {
            return self.abandon();
        };
        let run = Rc::clone(&self);
        dispatch(
            governor.as_ref(),
            Trampoline::suspend(move || run.invoke_step()),
        )
    }
}

impl<S: 'static, T: 'static> Complete<T> for LoopRun<S, T> {
    fn complete(self: Rc<Self>, occurrence: u64, value: T) -> Outcome {
        self.claim("finish", occurrence)?;
        self.finished.set(true);
        self.pending_reentry.set(false);

        let state = self.state.borrow_mut().take();
        drop(state);
        let step = self.step.borrow_mut().take();
        drop(step);
        let done = self.done.borrow_mut().take();

        tracing::trace!(occurrence, "loop run finished");
        if let Some(done) = done {
            done(value);
        }
        Ok(())
    }
}

/// The continuation that runs the step again.
///
/// Carries the loop-local state of the next occurrence by value. Clones share
/// the same occurrence, so only one of them (or the matching [`Finish`]) may
/// be signalled.
pub struct Proceed<S> {
    run: Rc<dyn Resume<S>>,
    occurrence: u64,
}

impl<S> Proceed<S> {
    /// Runs the next occurrence of the step with `state`.
    ///
    /// Called before the current step returns, the next occurrence starts
    /// once it has returned. Called later, the next occurrence is dispatched
    /// through the governor from this call.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if this occurrence was already
    /// signalled, belongs to an earlier occurrence, or the run has finished.
    /// Also returns any violation raised by steps that ran inside this call,
    /// and [`EngineError::Abandoned`] if the run's parking governor was
    /// dropped.
    pub fn next(self, state: S) -> Outcome {
        self.run.resume(self.occurrence, state)
    }

    /// Returns the step occurrence this continuation belongs to.
    #[inline]
    pub const fn occurrence(&self) -> u64 {
        self.occurrence
    }
}

impl Proceed<()> {
    /// Runs the next occurrence of a step that carries no state.
    ///
    /// # Errors
    ///
    /// See [`Proceed::next`].
    pub fn proceed(self) -> Outcome {
        self.next(())
    }
}

impl<S> Clone for Proceed<S> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
            occurrence: self.occurrence,
        }
    }
}

impl<S> fmt::Debug for Proceed<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Proceed")
            .field("occurrence", &self.occurrence)
            .finish_non_exhaustive()
    }
}

/// The continuation that terminates the loop and delivers its final value.
pub struct Finish<T> {
    run: Rc<dyn Complete<T>>,
    occurrence: u64,
}

impl<T> Finish<T> {
    /// Terminates the run and invokes its final continuation with `value`.
    ///
    /// The step and the final continuation are released before `value` is
    /// delivered.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if this occurrence was already
    /// signalled, belongs to an earlier occurrence, or the run has finished.
    pub fn finish(self, value: T) -> Outcome {
        self.run.complete(self.occurrence, value)
    }

    /// Returns the step occurrence this continuation belongs to.
    #[inline]
    pub const fn occurrence(&self) -> u64 {
        self.occurrence
    }
}

impl<T> Clone for Finish<T> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
            occurrence: self.occurrence,
        }
    }
}

impl<T> fmt::Debug for Finish<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Finish")
            .field("occurrence", &self.occurrence)
            .finish_non_exhaustive()
    }
}

// Loop state is confined to the thread that started the run.
assert_not_impl_any!(Proceed<()>: Send, Sync);
assert_not_impl_any!(Finish<()>: Send, Sync);
