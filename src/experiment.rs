use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, info_span};

use crate::classify::DistanceClassifier;
use crate::dataset::LabeledDataset;
use crate::sample::sample;
use crate::{Error, Label, Result};

pub const DEFAULT_QUERY_COUNT: usize = 500;

// One row of the schedule: draw `repetitions` reference sets of `size` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub size: usize,
    pub repetitions: usize,
}

impl ScheduleEntry {
    pub fn new(size: usize, repetitions: usize) -> Self {
        Self { size, repetitions }
    }
}

// Parsed from "size:repetitions", e.g. "500:20"
impl FromStr for ScheduleEntry {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (size, repetitions) = s
            .split_once(':')
            .ok_or_else(|| format!("expected size:repetitions, got {s:?}"))?;
        let size = size
            .trim()
            .parse()
            .map_err(|e| format!("bad size in {s:?}: {e}"))?;
        let repetitions = repetitions
            .trim()
            .parse()
            .map_err(|e| format!("bad repetition count in {s:?}: {e}"))?;
        Ok(Self { size, repetitions })
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.size, self.repetitions)
    }
}

/// Reference-set sizes to evaluate, with the number of random draws for each.
///
/// Small reference sets give noisy accuracies and get more draws, so sizes must be
/// strictly increasing and repetition counts must never increase along the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule(Vec<ScheduleEntry>);

impl Schedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptySchedule);
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.repetitions == 0 {
                return Err(Error::InvalidSchedule {
                    index,
                    reason: format!("{entry} has no repetitions"),
                });
            }
            if index == 0 {
                continue;
            }
            let previous = entries[index - 1];
            if entry.size <= previous.size {
                return Err(Error::InvalidSchedule {
                    index,
                    reason: format!("size of {entry} does not increase after {previous}"),
                });
            }
            if entry.repetitions > previous.repetitions {
                return Err(Error::InvalidSchedule {
                    index,
                    reason: format!("{entry} repeats more often than {previous}"),
                });
            }
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.0
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self(
            [
                (50, 100),
                (100, 50),
                (500, 20),
                (1000, 10),
                (2000, 5),
                (5000, 2),
                (10000, 1),
            ]
            .into_iter()
            .map(|(size, repetitions)| ScheduleEntry::new(size, repetitions))
            .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyCurvePoint {
    pub size: usize,
    pub mean_accuracy: f64,
    // Population variance of the per-repetition accuracies
    pub variance: f64,
}

// Fraction of predictions equal to the true label
pub fn accuracy(predictions: &[Label], truth: &[Label]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(predicted, actual)| predicted == actual)
        .count();
    correct as f64 / predictions.len() as f64
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

/// Measures how 1-NN accuracy changes with the size of the reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentRunner {
    // Size of the query set drawn once from the test pool
    pub query_count: usize,
    pub classifier: DistanceClassifier,
}

impl Default for ExperimentRunner {
    fn default() -> Self {
        Self {
            query_count: DEFAULT_QUERY_COUNT,
            classifier: DistanceClassifier::default(),
        }
    }
}

impl ExperimentRunner {
    pub fn new(query_count: usize, classifier: DistanceClassifier) -> Self {
        Self {
            query_count,
            classifier,
        }
    }

    /// Run the whole schedule and return one curve point per entry, in schedule order.
    ///
    /// The query set is drawn once and reused for every entry. The first error aborts the run.
    pub fn run(
        &self,
        train_pool: &LabeledDataset,
        test_pool: &LabeledDataset,
        schedule: &Schedule,
        rng: &mut impl Rng,
    ) -> Result<Vec<AccuracyCurvePoint>> {
        let queries = sample(test_pool, self.query_count, rng)?;
        info!(
            queries = queries.len(),
            pool = test_pool.len(),
            "drew fixed query set"
        );

        let mut curve = Vec::with_capacity(schedule.entries().len());
        for (index, entry) in schedule.entries().iter().enumerate() {
            let _span = info_span!("entry", index, size = entry.size).entered();
            let now = Instant::now();
            let point = self.run_entry(train_pool, &queries, entry, rng)?;
            info!(
                mean_accuracy = point.mean_accuracy,
                variance = point.variance,
                repetitions = entry.repetitions,
                elapsed_ms = now.elapsed().as_millis() as u64,
                "curve point"
            );
            curve.push(point);
        }
        Ok(curve)
    }

    fn run_entry(
        &self,
        train_pool: &LabeledDataset,
        queries: &LabeledDataset,
        entry: &ScheduleEntry,
        rng: &mut impl Rng,
    ) -> Result<AccuracyCurvePoint> {
        let mut accuracies = Vec::with_capacity(entry.repetitions);
        for repetition in 0..entry.repetitions {
            let now = Instant::now();
            let reference = sample(train_pool, entry.size, rng)?;
            let predictions = self.classifier.classify(&reference, queries.vectors())?;
            let acc = accuracy(&predictions, queries.labels());
            debug!(
                repetition,
                accuracy = acc,
                elapsed_ms = now.elapsed().as_millis() as u64,
                "classified query set"
            );
            accuracies.push(acc);
        }

        let (mean_accuracy, variance) = mean_and_variance(&accuracies);
        Ok(AccuracyCurvePoint {
            size: entry.size,
            mean_accuracy,
            variance,
        })
    }
}
