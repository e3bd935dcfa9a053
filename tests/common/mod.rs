//! Shared helpers for integration tests.
//!
//! [`EventQueue`] stands in for an external event source (I/O completion,
//! timers): bodies hand it the continuation call they would make later, and
//! the test fires the queued events once the starting call has returned.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use kiter::error::Outcome;

type Event = Box<dyn FnOnce() -> Outcome + 'static>;

/// A FIFO of callbacks fired outside any step frame.
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<VecDeque<Event>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event` to fire on a later `fire_next` / `fire_all`.
    pub fn schedule<F>(&self, event: F)
    where
        F: FnOnce() -> Outcome + 'static,
    {
        self.events.borrow_mut().push_back(Box::new(event));
    }

    /// Fires the oldest queued event. Returns `None` when nothing is queued.
    pub fn fire_next(&self) -> Option<Outcome> {
        let event = self.events.borrow_mut().pop_front()?;
        Some(event())
    }

    /// Fires events until the queue is empty, including events queued by
    /// the events themselves.
    pub fn fire_all(&self) -> Outcome {
        while let Some(outcome) = self.fire_next() {
            outcome?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

/// A cell shared between a test and the final continuation it passes in.
pub fn capture<T: 'static>() -> (Rc<RefCell<Option<T>>>, impl FnOnce(T) + 'static) {
    let slot = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&slot);
    (slot, move |value| *sink.borrow_mut() = Some(value))
}
