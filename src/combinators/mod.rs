//! List and tree combinators built on the loop driver.
//!
//! Each combinator is an [`Engine`](crate::engine::Engine) method that
//! configures one loop run. The loop-local bookkeeping (remaining input,
//! collected output, accumulator, frontier) is owned by the handle the body
//! receives and travels back into the loop when the body signals. A handle
//! is consumed by signalling, so it cannot be signalled twice.
//!
//! | Combinator | Body receives | Body signals | Final continuation receives |
//! |---|---|---|---|
//! | `foreach` | item, [`Advance`], [`Finish`](crate::control::Finish) | `advance.proceed()` / `finish.finish(())` | nothing |
//! | `map` | item, [`Collect`] | `collect.collect(outputs)` | every output, in input order |
//! | `filter` | [`Decide`] (holds the item) | `decide.decide(keep)` | kept items, in input order |
//! | `fold_left` | accumulator, item, [`Fold`] | `fold.collect(accumulator)` | `Option` of the final accumulator |
//! | `fold_right` | item (last to first), accumulator, [`Fold`] | `fold.collect(accumulator)` | `Option` of the final accumulator |
//! | `fold_from` | accumulator, item, [`Fold`] | `fold.collect(accumulator)` | final accumulator |
//! | `unfold` | seed, [`Unfold`] | `unfold.more(seed, items)` / `unfold.done(items)` | every emitted item |
//! | `descend` | node, [`Expand`] | `expand.expand(children)` | nothing |
//!
//! `fold_left` and `fold_right` answer empty and single-item inputs without
//! starting a loop or calling the body.

mod descend;
mod fold;
mod sequence;
mod unfold;

pub use descend::{Expand, Order};
pub use fold::Fold;
pub use sequence::{Advance, Collect, Decide};
pub use unfold::Unfold;

use std::iter::Peekable;

/// The remaining input of a sequence combinator.
pub(crate) type Items<X> = Peekable<Box<dyn Iterator<Item = X> + 'static>>;

pub(crate) fn cursor<I>(items: I) -> Items<I::Item>
where
    I: IntoIterator,
    I::IntoIter: 'static,
{
    let boxed: Box<dyn Iterator<Item = I::Item> + 'static> = Box::new(items.into_iter());
    boxed.peekable()
}
