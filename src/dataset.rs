use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis};

use crate::{Error, Feature, Label, Result};

/// An ordered set of labeled feature vectors, all of the same length.
///
/// Labels and vectors are kept as parallel storage: `labels[i]` belongs to row `i` of
/// `vectors`. Sampled subsets are separate `LabeledDataset`s holding copies of their rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    labels: Vec<Label>,
    vectors: Array2<Feature>,
}

impl LabeledDataset {
    pub fn new(labels: Vec<Label>, vectors: Array2<Feature>) -> Result<Self> {
        if labels.len() != vectors.nrows() {
            return Err(Error::DimensionMismatch(format!(
                "{} labels for {} vectors",
                labels.len(),
                vectors.nrows()
            )));
        }
        Ok(Self { labels, vectors })
    }

    /// Split a numeric table into labels (column 0) and vectors (the remaining columns).
    pub fn from_table(table: ArrayView2<Feature>) -> Result<Self> {
        if table.ncols() < 2 {
            return Err(Error::DimensionMismatch(format!(
                "table needs a label column and at least one feature column, got {} columns",
                table.ncols()
            )));
        }

        let labels = table
            .column(0)
            .iter()
            .enumerate()
            .map(|(row, &value)| {
                if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                    Ok(value as Label)
                } else {
                    Err(Error::InvalidLabel {
                        row,
                        value: value as f64,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let vectors = table.slice(s![.., 1..]).to_owned();

        Self::new(labels, vectors)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    // Length L shared by every vector
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn vectors(&self) -> ArrayView2<Feature> {
        self.vectors.view()
    }

    pub fn get(&self, index: usize) -> Option<(Label, ArrayView1<Feature>)> {
        let label = *self.labels.get(index)?;
        Some((label, self.vectors.row(index)))
    }

    /// Keep only the first `n` rows (or all of them, if there are fewer).
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            labels: self.labels[..n].to_vec(),
            vectors: self.vectors.slice(s![..n, ..]).to_owned(),
        }
    }

    /// Copy the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(Self {
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            vectors: self.vectors.select(Axis(0), indices),
        })
    }
}
