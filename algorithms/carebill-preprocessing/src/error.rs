//! Error definitions for preprocessing
use thiserror::Error;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("column `{0}` not found")]
    MissingColumn(String),
    #[error("column `{column}` holds {kind} values but must be numeric")]
    NonNumericColumn { column: String, kind: &'static str },
    #[error("unknown category `{value}` in column `{column}`")]
    UnknownCategory { column: String, value: String },
    #[error(transparent)]
    BaseCrate(#[from] carebill::error::Error),
}
