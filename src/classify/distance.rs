use ndarray::ArrayView1;

use crate::Feature;

// Sum of squares of a difference vector, accumulated in index order.
// Both strategies reduce through this so their distances agree bit for bit.
pub fn sum_of_squares(diff: ArrayView1<Feature>) -> Feature {
    diff.iter().fold(0.0, |acc, &d| acc + d * d)
}

// Index of the smallest distance. Ties go to the lowest index, and NaN never
// beats a real number. Returns None only for an empty input.
pub fn argmin(distances: impl IntoIterator<Item = Feature>) -> Option<usize> {
    distances
        .into_iter()
        .enumerate()
        .fold(None, |best, (i, d)| match best {
            Some((_, b)) if d < b || (b.is_nan() && !d.is_nan()) => Some((i, d)),
            None => Some((i, d)),
            keep => keep,
        })
        .map(|(i, _)| i)
}
