//! Awaiting the final value of a run.
//!
//! [`settle`] bridges a combinator's final continuation to a future, so
//! async code can start a loop or join and `.await` its result.
//!
//! # Examples
//!
//! ```rust
//! use kiter::engine::Engine;
//! use kiter::settle::settle;
//!
//! # futures::executor::block_on(async {
//! let engine = Engine::new();
//! let doubled = settle(|resolve| {
//!     engine.map(vec![1, 2, 3], |item, collect| collect.collect([item * 2]), resolve)
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # });
//! ```

use std::future::Future;

use futures::channel::oneshot;

use crate::error::{EngineError, Outcome};

/// A final continuation that completes a [`settle`] future.
pub type Resolve<T> = Box<dyn FnOnce(T) + 'static>;

/// Starts a run and returns a future of its final value.
///
/// `start` is called immediately with a [`Resolve`] to use as the run's final
/// continuation.
///
/// # Errors
///
/// The future resolves to the error `start` returned, if any, or to
/// [`EngineError::Abandoned`] if the run was dropped without finishing (every
/// continuation into it was released while it was stalled).
pub fn settle<T, F>(start: F) -> impl Future<Output = Result<T, EngineError>>
where
    T: 'static,
    F: FnOnce(Resolve<T>) -> Outcome,
{
    let (sender, receiver) = oneshot::channel();
    let resolve: Resolve<T> = Box::new(move |value| {
        // The receiver may have been dropped by a caller that lost interest.
        let _ = sender.send(value);
    });
    let started = start(resolve);
    async move {
        started?;
        receiver.await.map_err(|_canceled| EngineError::Abandoned)
    }
}
