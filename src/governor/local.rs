//! A governor that schedules onto the tokio local task set.

use std::cell::RefCell;
use std::fmt;

use super::{Bounce, Entry, Governor};
use crate::control::Trampoline;
use crate::error::{EngineError, Outcome};

/// Runs every re-entry and every unit as a task on the current tokio
/// [`LocalSet`](tokio::task::LocalSet), on a later tick than the call that
/// scheduled it.
///
/// Spawned work has nobody to return an error to, so failures are logged
/// and retained until [`take_failures`](Self::take_failures).
///
/// # Panics
///
/// `again` and `enter` panic when called outside a `LocalSet` context, as
/// [`tokio::task::spawn_local`] does.
#[derive(Default)]
pub struct LocalTaskGovernor {
    failures: std::rc::Rc<RefCell<Vec<EngineError>>>,
}

impl LocalTaskGovernor {
    /// Creates a local task governor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the errors raised by spawned work so far.
    pub fn take_failures(&self) -> Vec<EngineError> {
        self.failures.take()
    }

    fn spawn(&self, bounce: Bounce) {
        let failures = std::rc::Rc::clone(&self.failures);
        let _detached = tokio::task::spawn_local(async move {
            if let Err(error) = bounce.run() {
                tracing::error!(%error, "scheduled step failed");
                failures.borrow_mut().push(error);
            }
        });
    }
}

impl fmt::Debug for LocalTaskGovernor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LocalTaskGovernor")
            .field("failures", &self.failures.borrow().len())
            .finish()
    }
}

impl Governor for LocalTaskGovernor {
    fn again(&self, bounce: Bounce) -> Bounce {
        self.spawn(bounce);
        Trampoline::done(Ok(()))
    }

    fn enter(&self, entry: Entry) -> Outcome {
        self.spawn(Trampoline::suspend(move || Trampoline::done(entry())));
        Ok(())
    }
}
