use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

use super::distance::{argmin, sum_of_squares};
use crate::dataset::LabeledDataset;
use crate::{Feature, Label, Result};

// Full (reference x query) matrix of squared distances.
// The difference tensor of shape (reference, query, dim) is materialized in one go.
pub fn distance_matrix(
    reference: ArrayView2<Feature>,
    queries: ArrayView2<Feature>,
) -> Array2<Feature> {
    let diffs = &reference.insert_axis(Axis(1)) - &queries.insert_axis(Axis(0));
    diffs.map_axis(Axis(2), sum_of_squares)
}

/// Classify every query at once by reducing the full distance matrix along the reference axis.
///
/// Memory use grows with `|reference| * |queries| * dim`; see [`super::streaming::classify`]
/// for the bounded alternative.
pub fn classify(reference: &LabeledDataset, queries: ArrayView2<Feature>) -> Result<Vec<Label>> {
    super::check_dimensions(reference, queries)?;
    debug!(
        reference = reference.len(),
        queries = queries.nrows(),
        dim = reference.dim(),
        "computing full distance matrix"
    );

    let distances = distance_matrix(reference.vectors(), queries);
    Ok(distances
        .columns()
        .into_iter()
        .map(|column| {
            // check_dimensions guarantees a non-empty reference set
            let nearest = argmin(column.iter().copied()).unwrap_or(0);
            reference.labels()[nearest]
        })
        .collect())
}
