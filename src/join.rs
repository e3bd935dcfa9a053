//! Fan-out / fan-in over independent units of work.
//!
//! A join starts every unit through the governor's `enter` and invokes its
//! final continuation exactly once, after every unit has been started and
//! has reported completion. Units may complete during the start loop, later
//! from unrelated code, or any mix of both.
//!
//! No values travel from the units to the join point. Units that produce
//! results share them with the final continuation through their own
//! captures.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//! use kiter::engine::Engine;
//! use kiter::join::{Join, UnitDone};
//!
//! let parked: Rc<RefCell<Option<UnitDone>>> = Rc::new(RefCell::new(None));
//! let slot = Rc::clone(&parked);
//! let fired = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&fired);
//!
//! let join = Join::new()
//!     .unit(|done| done.done())
//!     .unit(move |done| {
//!         *slot.borrow_mut() = Some(done);
//!         Ok(())
//!     })
//!     .unit(|done| done.done());
//!
//! Engine::new().join(join, move || counter.set(counter.get() + 1)).unwrap();
//! assert_eq!(fired.get(), 0);
//!
//! let done = parked.borrow_mut().take().unwrap();
//! done.done().unwrap();
//! assert_eq!(fired.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::engine::Engine;
use crate::error::{EngineError, Outcome, ProtocolViolation, ViolationKind};

/// A unit of work: receives its completion continuation.
pub type Unit = Box<dyn FnOnce(UnitDone) -> Outcome + 'static>;

/// An ordered collection of units to run as one join.
#[derive(Default)]
pub struct Join {
    units: Vec<Unit>,
}

impl Join {
    /// Creates an empty join. An empty join fires as soon as it starts.
    #[must_use]
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Adds a unit and returns the join.
    #[must_use]
    pub fn unit<F>(mut self, unit: F) -> Self
    where
        F: FnOnce(UnitDone) -> Outcome + 'static,
    {
        self.push(unit);
        self
    }

    /// Adds a unit.
    pub fn push<F>(&mut self, unit: F)
    where
        F: FnOnce(UnitDone) -> Outcome + 'static,
    {
        self.units.push(Box::new(unit));
    }

    /// Returns the number of units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the join has no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<Unit> for Join {
    fn from_iter<T: IntoIterator<Item = Unit>>(iter: T) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl Extend<Unit> for Join {
    fn extend<T: IntoIterator<Item = Unit>>(&mut self, iter: T) {
        self.units.extend(iter);
    }
}

impl fmt::Debug for Join {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Join")
            .field("units", &self.units.len())
            .finish()
    }
}

struct JoinRun {
    outstanding: Cell<usize>,
    still_starting: Cell<bool>,
    completed: RefCell<Vec<bool>>,
    done: RefCell<Option<Box<dyn FnOnce() + 'static>>>,
}

impl JoinRun {
    fn fire_if_settled(&self) {
        if self.outstanding.get() != 0 || self.still_starting.get() {
            return;
        }
        let done = self.done.borrow_mut().take();
        if let Some(done) = done {
            tracing::trace!("join fired");
            done();
        }
    }

    fn complete(&self, index: usize) -> Outcome {
        let already = {
            let mut completed = self.completed.borrow_mut();
            std::mem::replace(&mut completed[index], true)
        };
        if already {
            tracing::warn!(unit = index, "join unit reported completion twice");
            return Err(EngineError::ProtocolViolation(ProtocolViolation {
                signal: "done",
                kind: ViolationKind::UnitAlreadyDone,
                occurrence: index as u64,
            }));
        }
        self.outstanding.set(self.outstanding.get() - 1);
        self.fire_if_settled();
        Ok(())
    }
}

/// The completion continuation of one join unit.
///
/// Clones refer to the same unit; only one completion is accepted.
#[derive(Clone)]
pub struct UnitDone {
    run: Rc<JoinRun>,
    index: usize,
}

impl UnitDone {
    /// Reports that the unit has finished.
    ///
    /// The join's final continuation runs inside this call if this was the
    /// last outstanding unit and every unit has been started.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if this unit already reported
    /// completion.
    pub fn done(self) -> Outcome {
        self.run.complete(self.index)
    }

    /// Returns the position of the unit in its join.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for UnitDone {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UnitDone")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Starts every unit of `join` and runs `done` once all have completed.
    ///
    /// Units are started in order through the governor's `enter`. `done`
    /// never runs before the last unit has been started, even if every unit
    /// completes synchronously.
    ///
    /// # Errors
    ///
    /// Returns the error of a unit that failed while being started; the
    /// remaining units are not started, and `done` is dropped without
    /// running.
    pub fn join<D>(&self, join: Join, done: D) -> Outcome
    where
        D: FnOnce() + 'static,
    {
        let units = join.units;
        let run = Rc::new(JoinRun {
            outstanding: Cell::new(units.len()),
            still_starting: Cell::new(true),
            completed: RefCell::new(vec![false; units.len()]),
            done: RefCell::new(Some(Box::new(done))),
        });
        tracing::trace!(units = units.len(), "join started");

        for (index, unit) in units.into_iter().enumerate() {
            let unit_done = UnitDone {
                run: Rc::clone(&run),
                index,
            };
            if let Err(error) = self.governor().enter(Box::new(move || unit(unit_done))) {
                tracing::warn!(unit = index, %error, "join abandoned: unit failed while starting");
                let done = run.done.borrow_mut().take();
                drop(done);
                return Err(error);
            }
        }

        run.still_starting.set(false);
        run.fire_if_settled();
        Ok(())
    }
}
