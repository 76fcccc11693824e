use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of one of the pipeline stages. None of them is recovered from.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not load the dataset")]
    DataAccess(#[from] carebill_datasets::Error),
    #[error("dataset does not match the feature schema")]
    Schema(#[from] carebill_preprocessing::Error),
    #[error("could not train the model")]
    Training(#[from] carebill::error::Error),
    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not render the chart: {0}")]
    Render(String),
}
