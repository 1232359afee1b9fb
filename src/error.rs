use thiserror::Error;

// Every failure the classifier or the experiment driver can report.
// Nothing is retried: all computation is deterministic, so errors go straight to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sample size {requested}: must be in 1..={available}")]
    InvalidSize { requested: usize, available: usize },

    #[error("row {index} is out of bounds for a dataset of {len} rows")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("experiment schedule is empty")]
    EmptySchedule,

    #[error("invalid schedule entry {index}: {reason}")]
    InvalidSchedule { index: usize, reason: String },

    #[error("row {row}: label {value} is not a non-negative integer")]
    InvalidLabel { row: usize, value: f64 },

    #[error("line {line}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
