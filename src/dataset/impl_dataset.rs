use super::{AsTargets, Dataset, DatasetBase, DatasetView, Float, Records};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};
use rand::{seq::SliceRandom, Rng};

/// Implementation without constraints on records and targets
///
/// This implementation block provides methods for the creation and mutation of datasets. This
/// includes swapping the targets, return the records etc.
impl<R: Records, S> DatasetBase<R, S> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: S) -> DatasetBase<R, S> {
        DatasetBase {
            records,
            targets,
            weights: Array1::zeros(0),
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &S {
        &self.targets
    }

    /// Returns optionally weights
    pub fn weights(&self) -> Option<&[f32]> {
        if !self.weights.is_empty() {
            self.weights.as_slice()
        } else {
            None
        }
    }

    /// Return a single weight
    ///
    /// The weight of the `idx`th observation is returned. If no weight is specified, then all
    /// observations are unweighted with default value `1.0`.
    pub fn weight_for(&self, idx: usize) -> f32 {
        self.weights.get(idx).copied().unwrap_or(1.0)
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// This allow the reader to understand its purpose while analysing results, for example
    /// feature importance plots.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }

    /// Return records of a dataset
    ///
    /// The records are data points from which predictions are made. This functions returns a
    /// reference to the record field.
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Updates the records of a dataset
    ///
    /// This function overwrites the records in a dataset. It also invalidates the weights and
    /// feature names.
    pub fn with_records<T: Records>(self, records: T) -> DatasetBase<T, S> {
        DatasetBase {
            records,
            targets: self.targets,
            weights: Array1::zeros(0),
            feature_names: Vec::new(),
        }
    }

    /// Updates the targets of a dataset
    ///
    /// This function overwrites the targets in a dataset.
    pub fn with_targets<T>(self, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records: self.records,
            targets,
            weights: self.weights,
            feature_names: self.feature_names,
        }
    }

    /// Updates the weights of a dataset
    pub fn with_weights(mut self, weights: Array1<f32>) -> DatasetBase<R, S> {
        self.weights = weights;

        self
    }

    /// Updates the feature names of a dataset
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, S> {
        let feature_names = names.into_iter().map(|x| x.into()).collect();

        self.feature_names = feature_names;

        self
    }
}

impl<F: Float, L, D: Data<Elem = F>, T: AsTargets<Elem = L>> DatasetBase<ArrayBase<D, Ix2>, T> {
    /// Check that records and targets describe the same samples and hold only finite values
    ///
    /// Tree based models cannot order `NaN` or infinite values, so they call this before fitting.
    pub fn check_finite(&self) -> Result<()>
    where
        L: Float,
    {
        let targets = self.targets.as_targets();
        if self.records.nrows() != targets.len() {
            return Err(Error::MismatchedShapes {
                records: self.records.nrows(),
                targets: targets.len(),
            });
        }

        if self.records.iter().any(|x| !x.is_finite()) || targets.iter().any(|x| !x.is_finite()) {
            return Err(Error::NonFiniteValues);
        }

        Ok(())
    }

    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetView<'_, F, L> {
        let records = self.records.view();
        let targets = self.targets.as_targets();

        DatasetBase::new(records, targets)
            .with_feature_names(self.feature_names.clone())
            .with_weights(self.weights.clone())
    }

    /// Shuffle the samples of a dataset
    ///
    /// Draws a random permutation with `rng` and returns an owned copy of the dataset with records,
    /// targets and weights reordered accordingly. The same seed always yields the same order.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Dataset<F, L>
    where
        L: Float,
    {
        let mut indices = (0..self.records.nrows()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select(&indices)
    }

    /// Select a subset of samples by index
    pub fn select(&self, indices: &[usize]) -> Dataset<F, L>
    where
        L: Float,
    {
        let records = self.records.select(Axis(0), indices);
        let targets = self.targets.as_targets().select(Axis(0), indices);

        let weights = if self.weights.is_empty() {
            Array1::zeros(0)
        } else {
            self.weights.select(Axis(0), indices)
        };

        DatasetBase::new(records, targets)
            .with_weights(weights)
            .with_feature_names(self.feature_names.clone())
    }

    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The first
    /// chunk holds the first `floor(ratio * nsamples)` observations and the second one holds the
    /// remaining ones, so that a ratio of `0.8` leaves `ceil(0.2 * nsamples)` observations for
    /// testing. Shuffle the dataset first to obtain a random split.
    ///
    /// ### Panics
    ///
    /// If `ratio` is not in `[0, 1]`
    pub fn split_with_ratio(&self, ratio: f32) -> (Dataset<F, L>, Dataset<F, L>)
    where
        L: Float,
    {
        assert!(
            (0.0..=1.0).contains(&ratio),
            "ratio has to be between zero and one"
        );

        let nsamples = self.records.nrows();
        let n = ((nsamples as f64) * (ratio as f64)).floor() as usize;
        let n = n.min(nsamples);

        let first = (0..n).collect::<Vec<_>>();
        let second = (n..nsamples).collect::<Vec<_>>();

        (self.select(&first), self.select(&second))
    }
}

impl<F: Float, L: Float> From<(Array2<F>, Array1<L>)> for DatasetBase<Array2<F>, Array1<L>> {
    fn from(rec_tar: (Array2<F>, Array1<L>)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}

impl<'a, F: Float, L: Float> From<(ArrayView2<'a, F>, ArrayView1<'a, L>)>
    for DatasetView<'a, F, L>
{
    fn from(rec_tar: (ArrayView2<'a, F>, ArrayView1<'a, L>)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}
