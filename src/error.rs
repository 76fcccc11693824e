//! Error types in carebill
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("not enough samples to fit a model")]
    NotEnoughSamples,
    #[error("mismatched number of samples: {records} records but {targets} targets")]
    MismatchedShapes { records: usize, targets: usize },
    #[error("records or targets contain non-finite values")]
    NonFiniteValues,
    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),
    #[error("column `{name}` has {found} rows, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        found: usize,
    },
}
