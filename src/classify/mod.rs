// Nearest-neighbour classification under squared euclidean distance

mod distance;
pub use distance::{argmin, sum_of_squares};

pub mod batched;
pub mod streaming;

use clap::ValueEnum;
use ndarray::ArrayView2;
use tracing::{debug, warn};

use crate::dataset::LabeledDataset;
use crate::{Error, Feature, Label, Result};

pub const DEFAULT_MEMORY_BUDGET: usize = 1 << 30;

// How the distances are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    // Batched if the full distance tensor fits in the memory budget, streaming otherwise
    Auto,
    Batched,
    Streaming,
}

/// 1-nearest-neighbour classifier. The "model" is the reference set passed to [`classify`].
///
/// [`classify`]: DistanceClassifier::classify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceClassifier {
    pub strategy: Strategy,
    // Largest difference tensor, in bytes, the batched path may allocate
    pub memory_budget: usize,
}

impl Default for DistanceClassifier {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            memory_budget: DEFAULT_MEMORY_BUDGET,
        }
    }
}

impl DistanceClassifier {
    pub fn new(strategy: Strategy, memory_budget: usize) -> Self {
        Self {
            strategy,
            memory_budget,
        }
    }

    /// The concrete strategy used for a problem of the given shape.
    ///
    /// A batched request that would not fit in the memory budget is downgraded to streaming.
    pub fn resolve(&self, reference_len: usize, query_len: usize, dim: usize) -> Strategy {
        let fits = batched_bytes(reference_len, query_len, dim) <= self.memory_budget;
        match self.strategy {
            Strategy::Streaming => Strategy::Streaming,
            Strategy::Auto if fits => Strategy::Batched,
            Strategy::Auto => Strategy::Streaming,
            Strategy::Batched if fits => Strategy::Batched,
            Strategy::Batched => {
                warn!(
                    bytes = batched_bytes(reference_len, query_len, dim),
                    budget = self.memory_budget,
                    "distance tensor exceeds memory budget, streaming instead"
                );
                Strategy::Streaming
            }
        }
    }

    /// Predict a label for each row of `queries`, in order.
    pub fn classify(
        &self,
        reference: &LabeledDataset,
        queries: ArrayView2<Feature>,
    ) -> Result<Vec<Label>> {
        let strategy = self.resolve(reference.len(), queries.nrows(), reference.dim());
        debug!(?strategy, "classifying");
        match strategy {
            Strategy::Batched => batched::classify(reference, queries),
            // resolve never returns Auto
            Strategy::Streaming | Strategy::Auto => streaming::classify(reference, queries),
        }
    }
}

// Size of the (reference, query, dim) difference tensor the batched path allocates
pub fn batched_bytes(reference_len: usize, query_len: usize, dim: usize) -> usize {
    reference_len
        .saturating_mul(query_len)
        .saturating_mul(dim)
        .saturating_mul(std::mem::size_of::<Feature>())
}

fn check_dimensions(reference: &LabeledDataset, queries: ArrayView2<Feature>) -> Result<()> {
    if reference.is_empty() {
        return Err(Error::DimensionMismatch(
            "reference set is empty".to_string(),
        ));
    }
    if queries.ncols() != reference.dim() {
        return Err(Error::DimensionMismatch(format!(
            "query vectors have length {}, reference vectors have length {}",
            queries.ncols(),
            reference.dim()
        )));
    }
    Ok(())
}
