use rand::Rng;

use crate::dataset::LabeledDataset;
use crate::{Error, Result};

// Pick n distinct indices from 0..len, uniformly at random
pub fn sample_indices(len: usize, n: usize, rng: &mut impl Rng) -> Result<Vec<usize>> {
    if n == 0 || n > len {
        return Err(Error::InvalidSize {
            requested: n,
            available: len,
        });
    }
    Ok(rand::seq::index::sample(rng, len, n).into_vec())
}

/// Draw `n` rows from `dataset` without replacement.
///
/// Each draw is independent; the only state shared between calls is `rng`, so a seeded
/// generator gives reproducible subsets.
pub fn sample(dataset: &LabeledDataset, n: usize, rng: &mut impl Rng) -> Result<LabeledDataset> {
    let indices = sample_indices(dataset.len(), n, rng)?;
    dataset.select(&indices)
}
