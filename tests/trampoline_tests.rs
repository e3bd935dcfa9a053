//! Unit tests for the Trampoline<A> type as the engine drives it.
//!
//! Tests cover:
//! - Basic construction (done, suspend)
//! - Outcome chains that stop at the first failure
//! - Stack safety for long bounce chains

use std::cell::Cell;
use std::rc::Rc;

use kiter::control::Trampoline;
use kiter::error::{EngineError, Outcome};
use kiter::governor::Bounce;
use rstest::rstest;

/// A chain of `remaining` bounces that settles with `Ok(())`, or with
/// `Err(Abandoned)` when it reaches `fail_at`.
fn chain(remaining: u64, fail_at: Option<u64>) -> Bounce {
    if fail_at == Some(remaining) {
        Trampoline::done(Err(EngineError::Abandoned))
    } else if remaining == 0 {
        Trampoline::done(Ok(()))
    } else {
        Trampoline::suspend(move || chain(remaining - 1, fail_at))
    }
}

// =============================================================================
// Basic Construction
// =============================================================================

#[rstest]
fn done_bounce_is_settled() {
    let bounce: Bounce = Trampoline::done(Ok(()));
    assert!(bounce.is_done());
    assert_eq!(bounce.run(), Ok(()));
}

#[rstest]
fn suspended_bounce_runs_on_demand() {
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let bounce: Bounce = Trampoline::suspend(move || {
        flag.set(true);
        Trampoline::done(Ok(()))
    });

    assert!(!bounce.is_done());
    assert!(!ran.get());
    assert_eq!(bounce.run(), Ok(()));
    assert!(ran.get());
}

#[rstest]
fn debug_hides_thunk() {
    let bounce: Bounce = Trampoline::suspend(|| Trampoline::done(Ok(())));
    assert_eq!(format!("{bounce:?}"), "Suspend(\"<thunk>\")");
}

// =============================================================================
// Outcome Chains
// =============================================================================

#[rstest]
#[case(5, None, Ok(()))]
#[case(5, Some(5), Err(EngineError::Abandoned))]
#[case(5, Some(2), Err(EngineError::Abandoned))]
#[case(0, Some(0), Err(EngineError::Abandoned))]
fn chain_settles_with_first_done(
    #[case] length: u64,
    #[case] fail_at: Option<u64>,
    #[case] expected: Outcome,
) {
    assert_eq!(chain(length, fail_at).run(), expected);
}

#[rstest]
fn failure_stops_later_steps() {
    let steps = Rc::new(Cell::new(0_u32));

    fn counted(steps: Rc<Cell<u32>>, remaining: u32) -> Bounce {
        steps.set(steps.get() + 1);
        if remaining == 3 {
            Trampoline::done(Err(EngineError::Abandoned))
        } else {
            Trampoline::suspend(move || counted(steps, remaining - 1))
        }
    }

    assert_eq!(counted(Rc::clone(&steps), 10).run(), Err(EngineError::Abandoned));
    assert_eq!(steps.get(), 8);
}

// =============================================================================
// Stack Safety
// =============================================================================

#[rstest]
fn long_chain_does_not_overflow() {
    assert_eq!(chain(1_000_000, None).run(), Ok(()));
}

#[rstest]
fn late_failure_in_long_chain_is_reported() {
    assert_eq!(chain(1_000_000, Some(1)).run(), Err(EngineError::Abandoned));
}
