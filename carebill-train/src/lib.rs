//! `carebill-train` fits a random forest that predicts the billing amount of a hospital stay
//! from a patient's age, gender, blood type and medical condition.
//!
//! ## The Big Picture
//!
//! The job is a straight line of four stages, each in its own module:
//!
//! 1. [`loader`] reads the patient records into a typed table
//! 2. [`transformer`] one-hot encodes the categorical features and extracts the target
//! 3. [`trainer`] splits the rows, fits the forest and scores it on both partitions
//! 4. [`reporter`] and [`plot`] write the scores and chart the feature importances
//!
//! Every parameter lives in [`config::PipelineConfig`]. The first failing stage aborts the run;
//! outputs of stages that already finished stay on disk.

pub mod config;
pub mod error;
pub mod loader;
pub mod plot;
pub mod reporter;
pub mod trainer;
pub mod transformer;

use log::info;

pub use config::{LabelSource, PipelineConfig, PlotStyle};
pub use error::{PipelineError, Result};
pub use reporter::FeatureImportance;
pub use trainer::{Residuals, Scores};

use transformer::Transformed;

/// What a finished run produced besides its files
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub scores: Scores,
    /// Labelled importances, most important first
    pub importances: Vec<FeatureImportance>,
}

/// Runs all stages with `config`, printing a progress line before each step
pub fn run(config: &PipelineConfig) -> Result<Report> {
    println!("Import Dataset ...");
    let table = loader::load_dataset(&config.data_path)?;

    println!("Transform Dataset ...");
    let Transformed {
        dataset,
        transformer,
    } = transformer::transform_dataset(&table, config)?;

    println!("Split Dataset ...");
    let (train, test) = trainer::split_dataset(&dataset, config)?;

    println!("Fit Model ...");
    let model = trainer::fit_model(&train, config)?;

    println!("Model Evaluation ...");
    let scores = trainer::evaluate(&model, &train, &test)?;

    println!("Store Metrics into txt File ...");
    reporter::write_metrics(&config.metrics_path, &scores)?;

    println!("Calculate Feature Importance ...");
    let labels = reporter::importance_labels(&table, &transformer, config.labels);
    let importances = reporter::importance_table(&model.feature_importances(), &labels);

    println!("Plot Feature Importance ...");
    plot::render_importances(&config.plot_path, &importances, &config.plot)?;
    info!("chart saved to {}", config.plot_path.display());

    Ok(Report {
        scores,
        importances,
    })
}
