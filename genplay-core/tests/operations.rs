//! Window operations driven through the public API

use genplay_core::operation::{
    ArithmeticOp, BinningMethod, BinningParams, IslandParams, IslandResult, ThresholdFilter,
};
use genplay_core::{
    CancellationToken, ChromosomeSelection, OperationPool, PoolConfig, ScalarOperation,
    ScoredWindow, TransformOperation, TwoTrackMethod, TwoTrackOperation, WindowList,
};
use std::thread;
use std::time::Instant;

fn tiled(chromosomes: usize, windows: usize, score: impl Fn(usize) -> f64) -> WindowList {
    let mut list = WindowList::new();
    for c in 0..chromosomes {
        let windows = (0..windows)
            .map(|i| ScoredWindow::new(i as i64 * 10, i as i64 * 10 + 10, score(i)))
            .collect();
        list.push_chromosome(format!("chr{}", c + 1), windows);
    }
    list
}

fn pool() -> OperationPool {
    OperationPool::new(&PoolConfig::new().with_threads(4)).expect("build pool")
}

#[test]
fn threaded_and_sequential_pools_agree() {
    let list = tiled(6, 2_000, |i| ((i * 7919) % 13) as f64 - 4.0);
    let token = CancellationToken::new();
    let threaded = pool();
    let sequential = OperationPool::sequential();

    let operations = vec![
        TransformOperation::Constant { op: ArithmeticOp::Multiply, value: 3.0 },
        TransformOperation::Threshold(ThresholdFilter::new(-1.0, 4.0)),
        TransformOperation::Density { half_width: 3 },
        TransformOperation::Islands(IslandParams {
            threshold: 2.0,
            max_gap: 20,
            min_island_length: 30,
            result: IslandResult::IslandAverage,
        }),
        TransformOperation::Binning(BinningParams::new(100, BinningMethod::Maximum)),
    ];
    for op in operations {
        let a = op.compute(&list, &threaded, &token).unwrap().unwrap();
        let b = op.compute(&list, &sequential, &token).unwrap().unwrap();
        assert_eq!(a, b, "{} differs between pools", op);
    }

    for op in [ScalarOperation::Min, ScalarOperation::Sum, ScalarOperation::StandardDeviation] {
        let a = op.compute(&list, &ChromosomeSelection::All, &threaded, &token).unwrap();
        let b = op.compute(&list, &ChromosomeSelection::All, &sequential, &token).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn min_is_idempotent_and_memoized() {
    let list = tiled(3, 500, |i| if i % 5 == 0 { 0.0 } else { i as f64 });
    let pool = pool();
    let token = CancellationToken::new();

    let first = ScalarOperation::Min
        .compute(&list, &ChromosomeSelection::All, &pool, &token)
        .unwrap();
    assert_eq!(first, Some(1.0));
    assert_eq!(list.cached_min(), Some(Some(1.0)));

    let second = ScalarOperation::Min
        .compute(&list, &ChromosomeSelection::All, &pool, &token)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn identity_constant_returns_equal_copy() {
    let list = tiled(2, 100, |i| i as f64);
    for (op, value) in [(ArithmeticOp::Add, 0.0), (ArithmeticOp::Divide, 1.0)] {
        let copy = TransformOperation::Constant { op, value }
            .compute(&list, &pool(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(copy, list);
    }
}

#[test]
fn two_track_addition_example() {
    let mut first = WindowList::new();
    first.push_chromosome("chr1", vec![ScoredWindow::new(0, 10, 2.0)]);
    let mut second = WindowList::new();
    second.push_chromosome("chr1", vec![ScoredWindow::new(5, 15, 3.0)]);

    let sum = TwoTrackOperation::new(TwoTrackMethod::Add)
        .compute(&first, &second, &pool(), &CancellationToken::new())
        .unwrap()
        .unwrap();
    assert_eq!(
        sum.windows(0),
        &[
            ScoredWindow::new(0, 5, 2.0),
            ScoredWindow::new(5, 10, 5.0),
            ScoredWindow::new(10, 15, 3.0),
        ]
    );
}

/// One short chromosome followed by several long ones
fn short_then_long(long_windows: usize) -> WindowList {
    let mut list = WindowList::new();
    list.push_chromosome("chr1", vec![ScoredWindow::new(0, 10, 1.0)]);
    for c in 2..=5 {
        let windows = (0..long_windows)
            .map(|i| ScoredWindow::new(i as i64 * 10, i as i64 * 10 + 10, (i % 17) as f64 + 1.0))
            .collect();
        list.push_chromosome(format!("chr{}", c), windows);
    }
    list
}

#[test]
fn cancellation_stops_long_operation_quickly() {
    let list = short_then_long(400_000);
    let token = CancellationToken::new();
    let op = TransformOperation::Density { half_width: 5 };

    let full_pool = OperationPool::sequential().with_stop_check_interval(1);
    let started = Instant::now();
    let full = op.compute(&list, &full_pool, &token).unwrap();
    let full_elapsed = started.elapsed();
    assert!(full.is_some());

    // fresh pool so progress starts from zero
    let pool = OperationPool::sequential().with_stop_check_interval(1);
    let started = Instant::now();
    let result = thread::scope(|scope| {
        let canceller = token.clone();
        let pool = &pool;
        scope.spawn(move || {
            while pool.progress().done < 1 {
                thread::yield_now();
            }
            canceller.cancel();
        });
        op.compute(&list, pool, &token)
    });
    let elapsed = started.elapsed();

    assert!(result.unwrap().is_none());
    assert!(pool.progress().done < list.chromosome_count());
    assert!(elapsed < full_elapsed, "stopped run took {:?}, full run {:?}", elapsed, full_elapsed);

    // a token cancelled up front stops every operation before any work
    let result = ScalarOperation::Sum
        .compute(&list, &ChromosomeSelection::All, &pool, &token)
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn filtering_and_scaling_chain() {
    let list = tiled(1, 10, |i| i as f64);
    let pool = OperationPool::sequential();
    let token = CancellationToken::new();

    let kept = TransformOperation::Threshold(ThresholdFilter::new(3.0, 6.0))
        .compute(&list, &pool, &token)
        .unwrap()
        .unwrap();
    let halved = TransformOperation::Constant { op: ArithmeticOp::Divide, value: 2.0 }
        .compute(&kept, &pool, &token)
        .unwrap()
        .unwrap();
    let scores: Vec<f64> = halved.windows(0).iter().map(|w| w.score).collect();
    assert_eq!(scores, vec![1.5, 2.0, 2.5, 3.0]);

    let total = ScalarOperation::Sum
        .compute(&halved, &ChromosomeSelection::All, &pool, &token)
        .unwrap();
    assert_eq!(total, Some(9.0));
}
