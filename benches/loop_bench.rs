//! Benchmark for the loop driver and combinators.
//!
//! Compares the trampolined loop under the immediate and deferred governors
//! against a plain iterator baseline, and measures the combinators built on
//! top of it.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kiter::control::Trampoline;
use kiter::engine::Engine;
use kiter::join::Join;
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

// =============================================================================
// Trampoline Benchmarks
// =============================================================================

fn count_down(n: u64) -> Trampoline<u64> {
    if n == 0 {
        Trampoline::done(0)
    } else {
        Trampoline::suspend(move || count_down(n - 1))
    }
}

fn benchmark_trampoline(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("trampoline");

    for depth in [100, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("count_down", depth),
            &depth,
            |bencher, &depth| {
                bencher.iter(|| black_box(count_down(black_box(depth)).run()));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Loop Benchmarks
// =============================================================================

fn sum_with(engine: &Engine, limit: u64) -> u64 {
    let result = Rc::new(Cell::new(0));
    let sink = Rc::clone(&result);
    engine
        .iterate(
            (0_u64, 0_u64),
            move |(index, sum), proceed, finish| {
                if index == limit {
                    finish.finish(sum)
                } else {
                    proceed.next((index + 1, sum + index))
                }
            },
            move |sum| sink.set(sum),
        )
        .unwrap();
    engine.drain().unwrap();
    result.get()
}

fn benchmark_loop(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("loop");

    for size in [100, 10_000] {
        group.bench_with_input(BenchmarkId::new("immediate", size), &size, |bencher, &size| {
            let engine = Engine::new();
            bencher.iter(|| black_box(sum_with(&engine, black_box(size))));
        });

        group.bench_with_input(BenchmarkId::new("deferred", size), &size, |bencher, &size| {
            let engine = Engine::deferred();
            bencher.iter(|| black_box(sum_with(&engine, black_box(size))));
        });

        // Baseline without continuations
        group.bench_with_input(BenchmarkId::new("iterator", size), &size, |bencher, &size| {
            bencher.iter(|| black_box((0..black_box(size)).sum::<u64>()));
        });
    }

    group.finish();
}

// =============================================================================
// Combinator Benchmarks
// =============================================================================

fn benchmark_combinators(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("combinators");
    let engine = Engine::new();
    let items: Vec<u64> = (0..1000).collect();

    group.bench_function("map_1000", |bencher| {
        bencher.iter(|| {
            let result = Rc::new(Cell::new(0));
            let sink = Rc::clone(&result);
            engine
                .map(
                    items.clone(),
                    |item, collect| collect.collect([item * 2]),
                    move |outputs: Vec<u64>| sink.set(outputs.len()),
                )
                .unwrap();
            black_box(result.get())
        });
    });

    group.bench_function("fold_left_1000", |bencher| {
        bencher.iter(|| {
            let result = Rc::new(Cell::new(None));
            let sink = Rc::clone(&result);
            engine
                .fold_left(
                    items.clone(),
                    |sum, item, fold| fold.collect(sum + item),
                    move |sum| sink.set(sum),
                )
                .unwrap();
            black_box(result.get())
        });
    });

    group.bench_function("descend_breadth_first_1023", |bencher| {
        bencher.iter(|| {
            let visits = Rc::new(Cell::new(0_u32));
            let counter = Rc::clone(&visits);
            engine
                .descend_breadth_first(
                    1_u32,
                    move |node, expand| {
                        counter.set(counter.get() + 1);
                        expand.expand([2 * node, 2 * node + 1].into_iter().filter(|child| *child < 1024))
                    },
                    || {},
                )
                .unwrap();
            black_box(visits.get())
        });
    });

    group.bench_function("join_100", |bencher| {
        bencher.iter(|| {
            let fired = Rc::new(Cell::new(false));
            let flag = Rc::clone(&fired);
            let mut join = Join::new();
            for _ in 0..100 {
                join.push(|unit_done| unit_done.done());
            }
            engine.join(join, move || flag.set(true)).unwrap();
            black_box(fired.get())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_trampoline,
    benchmark_loop,
    benchmark_combinators
);
criterion_main!(benches);
