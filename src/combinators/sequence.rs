//! `foreach`, `map` and `filter`.

use std::fmt;

use super::{Items, cursor};
use crate::control::{Finish, Proceed};
use crate::engine::Engine;
use crate::error::Outcome;

/// Continues a `foreach` with the next item.
pub struct Advance<X> {
    items: Items<X>,
    proceed: Proceed<Items<X>>,
    finish: Finish<()>,
}

impl<X> Advance<X> {
    /// Moves on to the next item, or finishes if none remain.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if the matching `finish` was already
    /// signalled, or any violation raised by steps run inside this call.
    pub fn proceed(mut self) -> Outcome {
        if self.items.peek().is_some() {
            self.proceed.next(self.items)
        } else {
            self.finish.finish(())
        }
    }
}

impl<X> fmt::Debug for Advance<X> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Advance")
            .field("occurrence", &self.proceed.occurrence())
            .finish_non_exhaustive()
    }
}

/// Delivers the outputs of one `map` item.
pub struct Collect<X, U> {
    items: Items<X>,
    outputs: Vec<U>,
    proceed: Proceed<(Items<X>, Vec<U>)>,
    finish: Finish<Vec<U>>,
}

impl<X, U> Collect<X, U> {
    /// Appends `produced` to the output and continues with the next item.
    ///
    /// An item may produce any number of outputs, including none.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by steps run inside this call.
    pub fn collect<O>(mut self, produced: O) -> Outcome
    where
        O: IntoIterator<Item = U>,
    {
        self.outputs.extend(produced);
        if self.items.peek().is_some() {
            self.proceed.next((self.items, self.outputs))
        } else {
            self.finish.finish(self.outputs)
        }
    }
}

impl<X, U> fmt::Debug for Collect<X, U> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Collect")
            .field("collected", &self.outputs.len())
            .finish_non_exhaustive()
    }
}

/// Holds the current `filter` item until the body decides on it.
pub struct Decide<X> {
    item: X,
    items: Items<X>,
    kept: Vec<X>,
    proceed: Proceed<(Items<X>, Vec<X>)>,
    finish: Finish<Vec<X>>,
}

impl<X> Decide<X> {
    /// Returns the item being decided on.
    #[inline]
    pub const fn item(&self) -> &X {
        &self.item
    }

    /// Keeps or drops the item and continues with the next one.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by steps run inside this call.
    pub fn decide(mut self, keep: bool) -> Outcome {
        if keep {
            self.kept.push(self.item);
        }
        if self.items.peek().is_some() {
            self.proceed.next((self.items, self.kept))
        } else {
            self.finish.finish(self.kept)
        }
    }
}

impl<X: fmt::Debug> fmt::Debug for Decide<X> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Decide")
            .field("item", &self.item)
            .field("kept", &self.kept.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Visits every item in order until the body finishes early.
    ///
    /// The body receives the item, an [`Advance`] and a [`Finish`] and must
    /// signal exactly one of them. `done` runs once the items are exhausted
    /// or the body finished.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use kiter::engine::Engine;
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let log = Rc::clone(&seen);
    ///
    /// Engine::new()
    ///     .foreach(
    ///         1..=10,
    ///         move |item, advance, finish| {
    ///             log.borrow_mut().push(item);
    ///             if item == 4 { finish.finish(()) } else { advance.proceed() }
    ///         },
    ///         || {},
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(*seen.borrow(), vec![1, 2, 3, 4]);
    /// ```
    pub fn foreach<I, F, D>(&self, items: I, mut body: F, done: D) -> Outcome
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: 'static,
        F: FnMut(I::Item, Advance<I::Item>, Finish<()>) -> Outcome + 'static,
        D: FnOnce() + 'static,
    {
        self.iterate(
            cursor(items),
            move |mut items: Items<I::Item>, proceed, finish: Finish<()>| match items.next() {
                Some(item) => {
                    let advance = Advance {
                        items,
                        proceed,
                        finish: finish.clone(),
                    };
                    body(item, advance, finish)
                }
                None => finish.finish(()),
            },
            move |()| done(),
        )
    }

    /// Transforms every item into zero or more outputs.
    ///
    /// `done` receives all outputs in input order, whatever order the bodies
    /// completed their [`Collect`] in relation to other work.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use kiter::engine::Engine;
    ///
    /// let result = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&result);
    ///
    /// Engine::new()
    ///     .map(vec![1, 2, 3], |item, collect| collect.collect([item * 10]), move |outputs| {
    ///         *sink.borrow_mut() = outputs;
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(*result.borrow(), vec![10, 20, 30]);
    /// ```
    pub fn map<I, U, F, D>(&self, items: I, mut body: F, done: D) -> Outcome
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: 'static,
        U: 'static,
        F: FnMut(I::Item, Collect<I::Item, U>) -> Outcome + 'static,
        D: FnOnce(Vec<U>) + 'static,
    {
        self.iterate(
            (cursor(items), Vec::new()),
            move |(mut items, outputs): (Items<I::Item>, Vec<U>), proceed, finish: Finish<Vec<U>>| {
                match items.next() {
                    Some(item) => body(
                        item,
                        Collect {
                            items,
                            outputs,
                            proceed,
                            finish,
                        },
                    ),
                    None => finish.finish(outputs),
                }
            },
            done,
        )
    }

    /// Keeps the items the body decides to keep.
    ///
    /// The body receives a [`Decide`] holding the current item.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use kiter::engine::Engine;
    ///
    /// let result = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&result);
    ///
    /// Engine::new()
    ///     .filter(
    ///         1..=6,
    ///         |decide| {
    ///             let keep = decide.item() % 2 == 0;
    ///             decide.decide(keep)
    ///         },
    ///         move |kept| *sink.borrow_mut() = kept,
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(*result.borrow(), vec![2, 4, 6]);
    /// ```
    pub fn filter<I, F, D>(&self, items: I, mut body: F, done: D) -> Outcome
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: 'static,
        F: FnMut(Decide<I::Item>) -> Outcome + 'static,
        D: FnOnce(Vec<I::Item>) + 'static,
    {
        self.iterate(
            (cursor(items), Vec::new()),
            move |(mut items, kept): (Items<I::Item>, Vec<I::Item>),
                  proceed,
                  finish: Finish<Vec<I::Item>>| match items.next() {
                Some(item) => body(Decide {
                    item,
                    items,
                    kept,
                    proceed,
                    finish,
                }),
                None => finish.finish(kept),
            },
            done,
        )
    }
}
