//! Left and right folds.

use std::fmt;

use super::{Items, cursor};
use crate::control::{Finish, Proceed};
use crate::engine::Engine;
use crate::error::Outcome;

/// Delivers the new accumulator of one fold step.
pub struct Fold<X, A> {
    items: Items<X>,
    proceed: Proceed<(Items<X>, A)>,
    finish: Finish<A>,
}

impl<X, A> Fold<X, A> {
    /// Continues the fold with `accumulator`, or finishes with it if no
    /// item remains.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by steps run inside this call.
    pub fn collect(mut self, accumulator: A) -> Outcome {
        if self.items.peek().is_some() {
            self.proceed.next((self.items, accumulator))
        } else {
            self.finish.finish(accumulator)
        }
    }
}

impl<X, A> fmt::Debug for Fold<X, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Fold")
            .field("occurrence", &self.proceed.occurrence())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Folds items from first to last, seeding the accumulator with the
    /// first item.
    ///
    /// `done` receives `None` for an empty input and the single item for a
    /// one-item input; in both cases the body is never called and no loop is
    /// started. Otherwise the body runs once per remaining item.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use kiter::engine::Engine;
    ///
    /// let result = Rc::new(Cell::new(None));
    /// let sink = Rc::clone(&result);
    ///
    /// Engine::new()
    ///     .fold_left(
    ///         vec![1, 2, 3],
    ///         |accumulator, item, fold| fold.collect(accumulator + item),
    ///         move |total| sink.set(total),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(result.get(), Some(6));
    /// ```
    pub fn fold_left<I, F, D>(&self, items: I, body: F, done: D) -> Outcome
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: 'static,
        F: FnMut(I::Item, I::Item, Fold<I::Item, I::Item>) -> Outcome + 'static,
        D: FnOnce(Option<I::Item>) + 'static,
    {
        let mut items = cursor(items);
        let Some(first) = items.next() else {
            done(None);
            return Ok(());
        };
        if items.peek().is_none() {
            done(Some(first));
            return Ok(());
        }
        self.fold_items(first, items, body, move |accumulator| done(Some(accumulator)))
    }

    /// Folds items from last to first, seeding the accumulator with the last
    /// item.
    ///
    /// The body receives the item before the accumulator. Empty and one-item
    /// inputs are answered as in [`fold_left`](Self::fold_left).
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
    /// let result = Rc::new(RefCell::new(None));
    /// let sink = Rc::clone(&result);
    ///
    /// Engine::new()
    ///     .fold_right(
    ///         vec!["a".to_string(), "b".to_string(), "c".to_string()],
    ///         |item, accumulator, fold| fold.collect(format!("({item} {accumulator})")),
    ///         move |nested| *sink.borrow_mut() = nested,
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(result.borrow().as_deref(), Some("(a (b c))"));
    /// ```
    pub fn fold_right<I, F, D>(&self, items: I, mut body: F, done: D) -> Outcome
    where
        I: IntoIterator,
        I::Item: 'static,
        F: FnMut(I::Item, I::Item, Fold<I::Item, I::Item>) -> Outcome + 'static,
        D: FnOnce(Option<I::Item>) + 'static,
    {
        let mut rest: Vec<I::Item> = items.into_iter().collect();
        let Some(last) = rest.pop() else {
            done(None);
            return Ok(());
        };
        if rest.is_empty() {
            done(Some(last));
            return Ok(());
        }
        self.fold_items(
            last,
            cursor(rest.into_iter().rev()),
            move |accumulator, item, fold| body(item, accumulator, fold),
            move |accumulator| done(Some(accumulator)),
        )
    }

    /// Folds items from first to last, starting from `initial`.
    ///
    /// The accumulator type may differ from the item type. An empty input
    /// finishes with `initial`.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    pub fn fold_from<A, I, F, D>(&self, initial: A, items: I, body: F, done: D) -> Outcome
    where
        A: 'static,
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: 'static,
        F: FnMut(A, I::Item, Fold<I::Item, A>) -> Outcome + 'static,
        D: FnOnce(A) + 'static,
    {
        self.fold_items(initial, cursor(items), body, done)
    }

    fn fold_items<X, A, F, D>(&self, initial: A, items: Items<X>, mut body: F, done: D) -> Outcome
    where
        X: 'static,
        A: 'static,
        F: FnMut(A, X, Fold<X, A>) -> Outcome + 'static,
        D: FnOnce(A) + 'static,
    {
        self.iterate(
            (items, initial),
            move |(mut items, accumulator): (Items<X>, A), proceed, finish: Finish<A>| {
                match items.next() {
                    Some(item) => body(
                        accumulator,
                        item,
                        Fold {
                            items,
                            proceed,
                            finish,
                        },
                    ),
                    None => finish.finish(accumulator),
                }
            },
            done,
        )
    }
}
