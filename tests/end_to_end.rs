use std::io::Write;

use ndarray::{array, Array2};
use rand::{rngs::SmallRng, SeedableRng};

use nn_mnist::classify::{DistanceClassifier, Strategy};
use nn_mnist::dataset::LabeledDataset;
use nn_mnist::experiment::{accuracy, ExperimentRunner, Schedule, ScheduleEntry};
use nn_mnist::mnist::load_mnist;
use nn_mnist::sample::sample;
use nn_mnist::Error;

fn four_point_pool() -> LabeledDataset {
    let vectors = array![[0.0_f32, 0.0], [0.0, 1.0], [5.0, 5.0], [5.0, 6.0]];
    LabeledDataset::new(vec![0, 0, 1, 1], vectors).unwrap()
}

// Eight rows, four per class, on two overlapping lines so small draws make mistakes
fn balanced_pool() -> LabeledDataset {
    let vectors = Array2::from_shape_fn((8, 2), |(i, j)| {
        if j == 0 {
            i as f32
        } else {
            (i % 2) as f32
        }
    });
    LabeledDataset::new((0..8).map(|i| usize::from(i >= 4)).collect(), vectors).unwrap()
}

// Two tight clusters, four rows each: (0..1, 0..1) for label 0 and (10..11, 10..11) for label 1
fn clusters(offset: f32) -> LabeledDataset {
    let vectors = Array2::from_shape_fn((8, 2), |(i, j)| {
        let corner = if j == 0 { (i / 2) % 2 } else { i % 2 };
        (10 * (i / 4) + corner) as f32 + offset
    });
    LabeledDataset::new((0..8).map(|i| i / 4).collect(), vectors).unwrap()
}

// The experiment done step by step: queries drawn once, then every reference set
// drawn from the same generator. Returns (mean, variance) per entry.
fn by_hand(
    train_pool: &LabeledDataset,
    test_pool: &LabeledDataset,
    query_count: usize,
    pairs: &[(usize, usize)],
    seed: u64,
) -> Vec<(f64, f64)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let classifier = DistanceClassifier::default();
    let queries = sample(test_pool, query_count, &mut rng).unwrap();
    pairs
        .iter()
        .map(|&(size, repetitions)| {
            let accuracies: Vec<f64> = (0..repetitions)
                .map(|_| {
                    let reference = sample(train_pool, size, &mut rng).unwrap();
                    let predictions = classifier.classify(&reference, queries.vectors()).unwrap();
                    accuracy(&predictions, queries.labels())
                })
                .collect();
            let n = accuracies.len() as f64;
            let mean = accuracies.iter().sum::<f64>() / n;
            let variance = accuracies.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            (mean, variance)
        })
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

fn schedule(pairs: &[(usize, usize)]) -> Schedule {
    Schedule::new(
        pairs
            .iter()
            .map(|&(size, repetitions)| ScheduleEntry::new(size, repetitions))
            .collect(),
    )
    .unwrap()
}

#[test]
fn four_point_queries() {
    let reference = four_point_pool();
    let queries = array![[0.0_f32, 0.4], [5.0, 5.4]];
    for strategy in [Strategy::Auto, Strategy::Batched, Strategy::Streaming] {
        let classifier = DistanceClassifier::new(strategy, usize::MAX);
        assert_eq!(
            classifier.classify(&reference, queries.view()).unwrap(),
            vec![0, 1]
        );
    }
}

#[test]
fn schedule_yields_one_point_per_entry() {
    let pool = balanced_pool();
    let runner = ExperimentRunner::new(8, DistanceClassifier::default());
    let curve = runner
        .run(
            &pool,
            &pool,
            &schedule(&[(2, 5), (4, 1)]),
            &mut SmallRng::seed_from_u64(3),
        )
        .unwrap();

    assert_eq!(curve.len(), 2);
    assert_eq!(curve[0].size, 2);
    assert_eq!(curve[1].size, 4);
    assert!(curve[0].variance >= 0.0);
    // A single repetition has nothing to vary
    assert_eq!(curve[1].variance, 0.0);
    for point in &curve {
        assert!((0.0..=1.0).contains(&point.mean_accuracy));
    }
}

#[test]
fn same_seed_same_curve() {
    let pool = balanced_pool();
    let runner = ExperimentRunner::new(6, DistanceClassifier::default());
    let schedule = schedule(&[(2, 10), (3, 4), (6, 1)]);

    let first = runner
        .run(&pool, &pool, &schedule, &mut SmallRng::seed_from_u64(11))
        .unwrap();
    let second = runner
        .run(&pool, &pool, &schedule, &mut SmallRng::seed_from_u64(11))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn strategy_does_not_change_the_curve() {
    let pool = balanced_pool();
    let schedule = schedule(&[(2, 10), (5, 3)]);
    let curves: Vec<_> = [
        DistanceClassifier::new(Strategy::Batched, usize::MAX),
        DistanceClassifier::new(Strategy::Streaming, usize::MAX),
        // Too small for any batch, so auto streams
        DistanceClassifier::new(Strategy::Auto, 1),
    ]
    .into_iter()
    .map(|classifier| {
        ExperimentRunner::new(5, classifier)
            .run(&pool, &pool, &schedule, &mut SmallRng::seed_from_u64(5))
            .unwrap()
    })
    .collect();
    assert_eq!(curves[0], curves[1]);
    assert_eq!(curves[0], curves[2]);
}

#[test]
fn empty_schedule_is_rejected() {
    assert!(matches!(Schedule::new(vec![]), Err(Error::EmptySchedule)));
}

#[test]
fn runs_from_csv_files() {
    let mut train = tempfile::NamedTempFile::new().unwrap();
    let mut test = tempfile::NamedTempFile::new().unwrap();
    for (label, x, y) in [(0, 0, 0), (0, 0, 1), (1, 5, 5), (1, 5, 6)] {
        writeln!(train, "{label},{x},{y}").unwrap();
    }
    writeln!(test, "0,0,0").unwrap();
    writeln!(test, "1,5,5").unwrap();
    train.flush().unwrap();
    test.flush().unwrap();

    let train_pool = load_mnist(train.path(), usize::MAX).unwrap();
    let test_pool = load_mnist(test.path(), usize::MAX).unwrap();
    assert_eq!(train_pool, four_point_pool());

    let curve = ExperimentRunner::new(2, DistanceClassifier::default())
        .run(
            &train_pool,
            &test_pool,
            &schedule(&[(4, 1)]),
            &mut SmallRng::seed_from_u64(0),
        )
        .unwrap();
    assert_eq!(curve.len(), 1);
    assert_eq!(curve[0].mean_accuracy, 1.0);
}

#[test]
fn query_length_mismatch_aborts_the_run() {
    let train_pool = four_point_pool();
    let test_pool = LabeledDataset::new(vec![0, 1], Array2::zeros((2, 3))).unwrap();
    let result = ExperimentRunner::new(2, DistanceClassifier::default()).run(
        &train_pool,
        &test_pool,
        &schedule(&[(2, 1)]),
        &mut SmallRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
}

#[test]
fn every_repetition_is_a_fresh_draw() {
    let train_pool = clusters(0.0);
    let test_pool = clusters(0.2);
    let pairs = [(2, 5), (4, 1)];
    let runner = ExperimentRunner::new(4, DistanceClassifier::default());

    // A two-row draw is either one row per cluster (every query right) or two rows of one
    // cluster (only that cluster's queries right), so over many seeds some entry must vary
    let mut varied = 0;
    for seed in 0..30 {
        let curve = runner
            .run(
                &train_pool,
                &test_pool,
                &schedule(&pairs),
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
        let expected = by_hand(&train_pool, &test_pool, 4, &pairs, seed);
        assert_eq!(curve.len(), expected.len());
        for (point, (mean, variance)) in curve.iter().zip(expected) {
            assert_close(point.mean_accuracy, mean);
            assert_close(point.variance, variance);
        }
        if curve[0].variance > 0.0 {
            varied += 1;
        }
    }
    assert!(varied > 0, "five draws of two rows never changed the accuracy");
}

#[test]
fn queries_are_drawn_once_for_the_whole_schedule() {
    let train_pool = clusters(0.0);
    let test_pool = clusters(0.2);
    let pairs = [(2, 4), (3, 2), (5, 1), (8, 1)];
    let runner = ExperimentRunner::new(3, DistanceClassifier::default());

    for seed in 0..30 {
        let curve = runner
            .run(
                &train_pool,
                &test_pool,
                &schedule(&pairs),
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
        let expected = by_hand(&train_pool, &test_pool, 3, &pairs, seed);
        for (point, (mean, _)) in curve.iter().zip(&expected) {
            assert_close(point.mean_accuracy, *mean);
        }
    }
}

#[test]
fn full_reference_set_scores_the_fixed_queries() {
    // With all eight rows as reference every query is classified correctly, so each
    // entry that uses the whole pool must report exactly 1
    let train_pool = clusters(0.0);
    let test_pool = clusters(0.2);
    let curve = ExperimentRunner::new(5, DistanceClassifier::default())
        .run(
            &train_pool,
            &test_pool,
            &schedule(&[(2, 3), (8, 2)]),
            &mut SmallRng::seed_from_u64(9),
        )
        .unwrap();
    assert_eq!(curve[1].mean_accuracy, 1.0);
    assert_eq!(curve[1].variance, 0.0);
}
