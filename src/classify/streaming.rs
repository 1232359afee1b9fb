use ndarray::{ArrayView2, Axis};
use tracing::trace;

use super::distance::{argmin, sum_of_squares};
use crate::dataset::LabeledDataset;
use crate::{Feature, Label, Result};

/// Classify queries one at a time.
///
/// Only one distance vector (and its `|reference| * dim` difference buffer) is alive at
/// once, so memory does not depend on the number of queries.
pub fn classify(reference: &LabeledDataset, queries: ArrayView2<Feature>) -> Result<Vec<Label>> {
    super::check_dimensions(reference, queries)?;
    let vectors = reference.vectors();

    Ok(queries
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(i, query)| {
            trace!(query = i, "streaming query");
            let diffs = &vectors - &query;
            let distances = diffs.map_axis(Axis(1), sum_of_squares);
            // check_dimensions guarantees a non-empty reference set
            let nearest = argmin(distances.iter().copied()).unwrap_or(0);
            reference.labels()[nearest]
        })
        .collect())
}
