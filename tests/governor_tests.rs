//! Integration tests for governors.
//!
//! Tests cover:
//! - Immediate governor running re-entries in place
//! - Deferred governor interleaving independent loops one step per pump
//! - Single-slot pending policy overwriting a parked call
//! - Caller-supplied governors through `Engine::with_governor`
//! - Runs released when their governor or continuations are dropped

#![cfg(feature = "combinators")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kiter::control::{Proceed, Trampoline};
use kiter::engine::Engine;
use kiter::governor::{
    Bounce, DeferredGovernor, Entry, Governor, ImmediateGovernor, PendingPolicy, SharedGovernor,
};
use kiter::error::{EngineError, Outcome};
use rstest::rstest;

fn tagged_foreach(engine: &Engine, tag: &'static str, log: &Rc<RefCell<Vec<String>>>) {
    let log = Rc::clone(log);
    engine
        .foreach(
            1..=3,
            move |item, advance, _finish| {
                log.borrow_mut().push(format!("{tag}{item}"));
                advance.proceed()
            },
            || {},
        )
        .unwrap();
}

// =============================================================================
// Immediate
// =============================================================================

#[rstest]
fn immediate_governor_completes_before_returning() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let engine = Engine::new();
    tagged_foreach(&engine, "a", &log);
    tagged_foreach(&engine, "b", &log);
    assert_eq!(*log.borrow(), vec!["a1", "a2", "a3", "b1", "b2", "b3"]);
}

#[rstest]
fn immediate_enter_runs_entry_in_place() {
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let outcome = ImmediateGovernor.enter(Box::new(move || {
        flag.set(true);
        Ok(())
    }));
    assert!(outcome.is_ok());
    assert!(ran.get());
}

// =============================================================================
// Deferred
// =============================================================================

#[rstest]
fn deferred_governor_interleaves_loops() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let engine = Engine::deferred();
    tagged_foreach(&engine, "a", &log);
    tagged_foreach(&engine, "b", &log);

    assert_eq!(*log.borrow(), vec!["a1", "b1"]);
    assert_eq!(engine.pending(), 2);

    engine.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["a1", "b1", "a2", "b2", "a3", "b3"]);
    assert_eq!(engine.pending(), 0);
}

#[rstest]
fn deferred_pump_runs_one_call_at_a_time() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let engine = Engine::deferred();
    tagged_foreach(&engine, "a", &log);

    assert_eq!(engine.pump(), Some(Ok(())));
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(engine.pump(), Some(Ok(())));
    assert_eq!(log.borrow().len(), 3);
    // The last item finished the loop, nothing was parked after it.
    assert_eq!(engine.pump(), None);
}

#[rstest]
fn deferred_drain_stops_at_first_failure() {
    let governor = DeferredGovernor::new();
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);

    let _ = governor.again(Trampoline::done(Err(kiter::error::EngineError::Abandoned)));
    let _ = governor.again(Trampoline::suspend(move || {
        flag.set(true);
        Trampoline::done(Ok(()))
    }));

    assert!(governor.drain().is_err());
    assert!(!ran.get());
    assert_eq!(governor.pending(), 1);
}

// =============================================================================
// Single Slot
// =============================================================================

#[rstest]
fn single_slot_keeps_only_latest_call() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let engine = Engine::deferred_with(PendingPolicy::SingleSlot);
    tagged_foreach(&engine, "a", &log);
    tagged_foreach(&engine, "b", &log);

    // The second loop's re-entry overwrote the first one's.
    assert_eq!(engine.pending(), 1);
    engine.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["a1", "b1", "b2", "b3"]);
}

#[rstest]
fn single_slot_drives_a_lone_loop_to_completion() {
    let finished = Rc::new(Cell::new(false));
    let flag = Rc::clone(&finished);
    let engine = Engine::deferred_with(PendingPolicy::SingleSlot);
    engine
        .foreach(0..100, |_item, advance, _finish| advance.proceed(), move || {
            flag.set(true);
        })
        .unwrap();
    engine.drain().unwrap();
    assert!(finished.get());
}

// =============================================================================
// Custom Governors
// =============================================================================

/// Counts re-entries and runs them in place.
#[derive(Default)]
struct CountingGovernor {
    reentries: Cell<u32>,
    entries: Cell<u32>,
}

impl Governor for CountingGovernor {
    fn again(&self, bounce: Bounce) -> Bounce {
        self.reentries.set(self.reentries.get() + 1);
        bounce
    }

    fn enter(&self, entry: Entry) -> Outcome {
        self.entries.set(self.entries.get() + 1);
        entry()
    }
}

#[rstest]
fn engine_uses_caller_supplied_governor() {
    let governor = Rc::new(CountingGovernor::default());
    let engine = Engine::with_governor(Rc::clone(&governor) as SharedGovernor);
    assert!(!engine.is_deferred());

    engine
        .foreach(1..=5, |_item, advance, _finish| advance.proceed(), || {})
        .unwrap();

    // One re-entry per item after the first.
    assert_eq!(governor.reentries.get(), 4);
    assert_eq!(governor.entries.get(), 0);
}

// =============================================================================
// Reclamation
// =============================================================================

type Parked = Rc<RefCell<Option<Proceed<()>>>>;

/// Starts a run on `engine` whose first step parks its `Proceed`.
fn parked_run(engine: &Engine, witness: &Rc<()>, finished: &Rc<Cell<bool>>) -> Parked {
    let parked: Parked = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&parked);
    let held = Rc::clone(witness);
    let flag = Rc::clone(finished);
    engine
        .run(
            move |proceed, _finish| {
                let _keep = &held;
                *slot.borrow_mut() = Some(proceed);
                Ok(())
            },
            move || flag.set(true),
        )
        .unwrap();
    parked
}

#[rstest]
fn deferred_run_is_released_when_engine_drops() {
    let witness = Rc::new(());
    let held = Rc::clone(&witness);
    let engine = Engine::deferred();
    engine
        .run(
            move |proceed, _finish| {
                let _keep = &held;
                proceed.proceed()
            },
            || {},
        )
        .unwrap();
    assert_eq!(engine.pending(), 1);
    assert_eq!(Rc::strong_count(&witness), 2);

    drop(engine);
    assert_eq!(Rc::strong_count(&witness), 1);
}

#[rstest]
fn deferred_run_parked_by_a_clone_outlives_the_original() {
    let witness = Rc::new(());
    let held = Rc::clone(&witness);
    let engine = Engine::deferred();
    let keeper = engine.clone();
    engine
        .run(
            move |proceed, _finish| {
                let _keep = &held;
                proceed.proceed()
            },
            || {},
        )
        .unwrap();

    drop(engine);
    assert_eq!(Rc::strong_count(&witness), 2);
    assert_eq!(keeper.pump(), Some(Ok(())));
    assert_eq!(keeper.pending(), 1);

    drop(keeper);
    assert_eq!(Rc::strong_count(&witness), 1);
}

#[rstest]
fn stalled_deferred_run_is_released_when_continuation_drops() {
    let engine = Engine::deferred();
    let witness = Rc::new(());
    let finished = Rc::new(Cell::new(false));
    let parked = parked_run(&engine, &witness, &finished);

    assert_eq!(engine.pending(), 0);
    assert_eq!(Rc::strong_count(&witness), 2);

    parked.borrow_mut().take();
    assert_eq!(Rc::strong_count(&witness), 1);
    assert!(!finished.get());
}

#[rstest]
fn continuation_after_deferred_governor_drops_abandons_run() {
    let engine = Engine::deferred();
    let witness = Rc::new(());
    let finished = Rc::new(Cell::new(false));
    let parked = parked_run(&engine, &witness, &finished);

    drop(engine);
    let proceed = parked.borrow_mut().take().unwrap();
    assert_eq!(proceed.clone().proceed(), Err(EngineError::Abandoned));
    assert_eq!(Rc::strong_count(&witness), 1);
    assert!(!finished.get());

    // The run is finished for good: later signals are violations.
    assert!(proceed.proceed().unwrap_err().is_protocol_violation());
}

#[rstest]
fn single_slot_overwrite_releases_the_dropped_run() {
    let engine = Engine::deferred_with(PendingPolicy::SingleSlot);
    let witness = Rc::new(());
    for _ in 0..2 {
        let held = Rc::clone(&witness);
        engine
            .run(
                move |proceed, _finish| {
                    let _keep = &held;
                    proceed.proceed()
                },
                || {},
            )
            .unwrap();
    }

    assert_eq!(engine.pending(), 1);
    assert_eq!(Rc::strong_count(&witness), 2);
}

#[cfg(feature = "async")]
#[rstest]
fn local_run_is_released_when_local_set_drops() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let local = tokio::task::LocalSet::new();
    let witness = Rc::new(());
    let held = Rc::clone(&witness);
    let steps = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&steps);

    local.block_on(&runtime, async move {
        Engine::local()
            .run(
                move |proceed, _finish| {
                    let _keep = &held;
                    counter.set(counter.get() + 1);
                    proceed.proceed()
                },
                || {},
            )
            .unwrap();
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
    });

    assert!(steps.get() >= 1);
    assert_eq!(Rc::strong_count(&witness), 2);

    drop(local);
    assert_eq!(Rc::strong_count(&witness), 1);
}
