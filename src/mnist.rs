use ndarray::Array2;
use std::path::Path;

use crate::dataset::LabeledDataset;
use crate::{Error, Feature, Result};

// Load MNIST images from a csv file.
// The expected format is:
// - No headers
// - One image per row
// - Each row starts with the class label 0-9
// - The rest of the row consists of 28x28 pixel values
// Pixel values are kept as they are, no scaling is applied.
// At most n_examples rows are read.
pub fn load_mnist(path: impl AsRef<Path>, n_examples: usize) -> Result<LabeledDataset> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    read_table(reader, n_examples)
}

// Same as load_mnist, for any reader (used for in-memory data)
pub fn read_mnist(input: impl std::io::Read, n_examples: usize) -> Result<LabeledDataset> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(input);
    read_table(reader, n_examples)
}

fn read_table<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    n_examples: usize,
) -> Result<LabeledDataset> {
    // The csv reader rejects rows whose length differs from the first one,
    // so the flat buffer always forms a rectangle
    let mut values: Vec<Feature> = Vec::new();
    let mut n_rows = 0;
    let mut n_cols = 0;
    for result in reader.records().take(n_examples) {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        for (column, field) in record.iter().enumerate() {
            let value = field
                .trim()
                .parse::<Feature>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::Parse {
                    line,
                    column,
                    value: field.to_string(),
                })?;
            values.push(value);
        }
        n_cols = record.len();
        n_rows += 1;
    }

    let table = Array2::from_shape_vec((n_rows, n_cols), values).map_err(|e| {
        Error::DimensionMismatch(format!("{n_rows} rows of {n_cols} columns: {e}"))
    })?;
    LabeledDataset::from_table(table.view())
}
