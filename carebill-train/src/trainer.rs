//! Model trainer stage

use carebill::prelude::*;
use carebill_ensemble::RandomForestRegressor;
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::config::PipelineConfig;
use crate::error::Result;

/// Coefficients of determination in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub train: f64,
    pub test: f64,
}

/// Absolute errors and explained variance of the predictions on one partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residuals {
    pub mean_absolute: f64,
    pub max: f64,
    pub explained_variance: f64,
}

/// Compares the predictions of `model` on `dataset` with its targets
pub fn residuals(model: &RandomForestRegressor<f64>, dataset: &Dataset<f64, f64>) -> Residuals {
    let predicted = model.predict(dataset);

    Residuals {
        mean_absolute: predicted.mean_absolute_error(dataset.targets()),
        max: predicted.max_error(dataset.targets()),
        explained_variance: predicted.explained_variance(dataset.targets()),
    }
}

/// Shuffles `dataset` with the configured seed and splits it into training and test partitions
///
/// The training partition holds `floor(train_ratio * n)` rows. An empty dataset cannot be split.
pub fn split_dataset(
    dataset: &Dataset<f64, f64>,
    config: &PipelineConfig,
) -> Result<(Dataset<f64, f64>, Dataset<f64, f64>)> {
    if dataset.nsamples() == 0 || dataset.nfeatures() == 0 {
        return Err(Error::NotEnoughSamples.into());
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, test) = dataset
        .shuffle(&mut rng)
        .split_with_ratio(config.train_ratio);
    info!(
        "split {} rows into {} for training and {} for testing",
        dataset.nsamples(),
        train.nsamples(),
        test.nsamples()
    );

    Ok((train, test))
}

/// Fits the forest on the training partition
pub fn fit_model(
    train: &Dataset<f64, f64>,
    config: &PipelineConfig,
) -> Result<RandomForestRegressor<f64>> {
    let model = RandomForestRegressor::params()
        .n_estimators(config.n_estimators)
        .max_depth(config.max_depth)
        .seed(config.seed)
        .fit(train)?;

    Ok(model)
}

/// Scores the model on both partitions
pub fn evaluate(
    model: &RandomForestRegressor<f64>,
    train: &Dataset<f64, f64>,
    test: &Dataset<f64, f64>,
) -> Result<Scores> {
    if test.nsamples() == 0 {
        return Err(Error::NotEnoughSamples.into());
    }

    let scores = Scores {
        train: model.predict(train).r2(train.targets()) * 100.0,
        test: model.predict(test).r2(test.targets()) * 100.0,
    };
    info!(
        "variance explained: {:.3}% on training, {:.3}% on test",
        scores.train, scores.test
    );

    let residuals = residuals(model, test);
    debug!(
        "test residuals: mean absolute {:.2}, max {:.2}, explained variance {:.4}",
        residuals.mean_absolute, residuals.max, residuals.explained_variance
    );

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use ndarray::{Array1, Array2};

    fn linear(n: usize) -> Dataset<f64, f64> {
        let records = Array2::from_shape_fn((n, 2), |(i, j)| (i * (j + 1)) as f64);
        let targets = Array1::from_shape_fn(n, |i| 3. * i as f64 + 1.);
        Dataset::new(records, targets)
    }

    #[test]
    fn split_is_eighty_twenty_and_covers_all_rows() {
        let dataset = linear(10);
        let (train, test) = split_dataset(&dataset, &PipelineConfig::default()).unwrap();

        assert_eq!(train.nsamples(), 8);
        assert_eq!(test.nsamples(), 2);

        let mut seen: Vec<f64> = train.targets().iter().chain(test.targets()).cloned().collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, dataset.targets().to_vec());
    }

    #[test]
    fn split_is_reproducible() {
        let dataset = linear(25);
        let config = PipelineConfig::default();

        let (a, _) = split_dataset(&dataset, &config).unwrap();
        let (b, _) = split_dataset(&dataset, &config).unwrap();
        assert_eq!(a.targets(), b.targets());
    }

    #[test]
    fn empty_dataset_is_a_training_error() {
        let dataset = Dataset::new(Array2::<f64>::zeros((0, 4)), Array1::<f64>::zeros(0));
        let err = split_dataset(&dataset, &PipelineConfig::default()).unwrap_err();

        assert!(matches!(err, PipelineError::Training(Error::NotEnoughSamples)));
    }

    #[test]
    fn scores_are_percentages() {
        let config = PipelineConfig::default().n_estimators(20);
        let (train, test) = split_dataset(&linear(50), &config).unwrap();
        let model = fit_model(&train, &config).unwrap();
        let scores = evaluate(&model, &train, &test).unwrap();

        assert!(scores.train > 50.0 && scores.train <= 100.0);
        assert!(scores.test <= 100.0);
    }

    #[test]
    fn residuals_bound_the_test_errors() {
        let config = PipelineConfig::default().n_estimators(20);
        let (train, test) = split_dataset(&linear(50), &config).unwrap();
        let model = fit_model(&train, &config).unwrap();

        let fitted = residuals(&model, &train);
        let held_out = residuals(&model, &test);

        assert!(fitted.mean_absolute >= 0.0);
        assert!(held_out.max >= held_out.mean_absolute);
        assert!(fitted.explained_variance > 0.5 && fitted.explained_variance <= 1.0);
        assert_eq!(held_out, residuals(&model, &test));
    }

    #[test]
    fn zero_estimators_are_rejected() {
        let config = PipelineConfig::default().n_estimators(0);
        let err = fit_model(&linear(10), &config).unwrap_err();

        assert!(matches!(err, PipelineError::Training(Error::Parameters(_))));
    }
}
