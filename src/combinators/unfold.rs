//! Generating a sequence from a seed.

use std::fmt;

use crate::control::{Finish, Proceed};
use crate::engine::Engine;
use crate::error::Outcome;

/// Emits items for one `unfold` step and either asks for more or stops.
pub struct Unfold<S, X> {
    emitted: Vec<X>,
    proceed: Proceed<(S, Vec<X>)>,
    finish: Finish<Vec<X>>,
}

impl<S, X> Unfold<S, X> {
    /// Emits `items` and runs the body again with `seed`.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by steps run inside this call.
    pub fn more<O>(mut self, seed: S, items: O) -> Outcome
    where
        O: IntoIterator<Item = X>,
    {
        self.emitted.extend(items);
        self.proceed.next((seed, self.emitted))
    }

    /// Emits `items` and ends the sequence.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by the final continuation's run.
    pub fn done<O>(mut self, items: O) -> Outcome
    where
        O: IntoIterator<Item = X>,
    {
        self.emitted.extend(items);
        self.finish.finish(self.emitted)
    }

    /// Ends the sequence without emitting anything more.
    ///
    /// # Errors
    ///
    /// See [`done`](Self::done).
    pub fn stop(self) -> Outcome {
        self.done(std::iter::empty())
    }

    /// Returns how many items have been emitted so far.
    #[inline]
    pub fn emitted(&self) -> usize {
        self.emitted.len()
    }
}

impl<S, X> fmt::Debug for Unfold<S, X> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Unfold")
            .field("emitted", &self.emitted.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Builds a sequence by repeatedly applying the body to a seed.
    ///
    /// Each body call emits zero or more items and either continues with a
    /// new seed ([`Unfold::more`]) or ends ([`Unfold::done`]). `done`
    /// receives every emitted item in emission order.
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
    ///     .unfold(
    ///         1,
    ///         |n, unfold| if n < 5 { unfold.more(n + 1, [n]) } else { unfold.stop() },
    ///         move |items| *sink.borrow_mut() = items,
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(*result.borrow(), vec![1, 2, 3, 4]);
    /// ```
    pub fn unfold<S, X, F, D>(&self, seed: S, mut body: F, done: D) -> Outcome
    where
        S: 'static,
        X: 'static,
        F: FnMut(S, Unfold<S, X>) -> Outcome + 'static,
        D: FnOnce(Vec<X>) + 'static,
    {
        self.iterate(
            (seed, Vec::new()),
            move |(seed, emitted): (S, Vec<X>), proceed, finish| {
                body(
                    seed,
                    Unfold {
                        emitted,
                        proceed,
                        finish,
                    },
                )
            },
            done,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[rstest]
    fn test_unfold_emits_several_items_per_step() {
        let result = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&result);
        Engine::new()
            .unfold(
                0_u32,
                |n, unfold| {
                    if n < 3 {
                        unfold.more(n + 1, [n, n * 10])
                    } else {
                        unfold.done([99])
                    }
                },
                move |items| *sink.borrow_mut() = items,
            )
            .unwrap();
        assert_eq!(*result.borrow(), vec![0, 0, 1, 10, 2, 20, 99]);
    }

    #[rstest]
    fn test_unfold_collatz_lengths() {
        let result = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&result);
        Engine::new()
            .unfold(
                6_u64,
                |n, unfold| match n {
                    1 => unfold.done([1]),
                    even if even % 2 == 0 => unfold.more(even / 2, [even]),
                    odd => unfold.more(3 * odd + 1, [odd]),
                },
                move |items| *sink.borrow_mut() = items,
            )
            .unwrap();
        assert_eq!(*result.borrow(), vec![6, 3, 10, 5, 16, 8, 4, 2, 1]);
    }

    #[rstest]
    fn test_unfold_handle_reports_emitted_count() {
        let counts = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&counts);
        Engine::new()
            .unfold(
                0_usize,
                move |n, unfold: Unfold<usize, usize>| {
                    log.borrow_mut().push(unfold.emitted());
                    if n < 2 { unfold.more(n + 1, [n]) } else { unfold.stop() }
                },
                |_items| {},
            )
            .unwrap();
        assert_eq!(*counts.borrow(), vec![0, 1, 2]);
    }
}
