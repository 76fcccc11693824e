use carebill::{
    dataset::{AsTargets, DatasetBase, Records},
    error::{Error, Result},
    traits::*,
    Float, ParamGuard,
};
use carebill_trees::DecisionTreeRegressor;
use log::debug;
use ndarray::{Array1, ArrayBase, Data, Ix2};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::hyperparams::RandomForestRegressorValidParams;

/// A fitted random forest for regression
///
/// ### Structure
///
/// The forest owns its member [trees](carebill_trees::DecisionTreeRegressor). Tree `k` was fit on
/// the training set with every sample weighted by how often it was drawn into the `k`th bootstrap
/// resample, so samples that were never drawn take no part in that tree.
///
/// ### Algorithm
///
/// A single generator, seeded from the hyperparameters, is consumed in a fixed order: first the
/// resample of a tree, then the seed that tree uses to order its features, then the next tree.
/// Fitting is therefore a pure function of the data and the hyperparameters.
///
/// ### Predictions
///
/// The prediction for a sample is the mean of the predictions of all trees.
///
/// ### Feature importance
///
/// Every tree with at least one split contributes its normalized importances. Their mean is
/// normalized again so the forest's importances sum to one.
///
/// ### Example
///
/// ```rust
/// use carebill::prelude::*;
/// use carebill_ensemble::RandomForestRegressor;
/// use ndarray::Array2;
///
/// let records = Array2::from_shape_fn((30, 3), |(i, j)| ((i + 1) * (j + 1) % 7) as f64);
/// let targets = records.column(1).mapv(|x| 2. * x);
/// let dataset = Dataset::new(records, targets);
///
/// let forest = RandomForestRegressor::params()
///     .n_estimators(20)
///     .fit(&dataset)
///     .unwrap();
///
/// assert_eq!(forest.trees().len(), 20);
/// assert!(forest.predict(&dataset).r2(&dataset.targets) > 0.5);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestRegressor<F: Float> {
    trees: Vec<DecisionTreeRegressor<F>>,
    num_features: usize,
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for RandomForestRegressor<F>
{
    /// Average the predictions of all trees for each row of `x`
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        y.fill(F::zero());
        for tree in &self.trees {
            let prediction: Array1<F> = tree.predict(x);
            *y += &prediction;
        }

        let n_trees = F::cast(self.trees.len().max(1));
        y.mapv_inplace(|v| v / n_trees);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for RandomForestRegressorValidParams<F>
where
    D: Data<Elem = F>,
    T: AsTargets<Elem = F>,
{
    type Object = RandomForestRegressor<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let nsamples = dataset.nsamples();
        if nsamples == 0 {
            return Err(Error::NotEnoughSamples);
        }
        dataset.check_finite()?;

        let records = dataset.records().view();
        let targets = dataset.targets().as_targets();
        let feature_names = dataset.feature_names();
        let draws = self.max_samples().unwrap_or(nsamples);

        let mut rng = StdRng::seed_from_u64(self.seed());
        let mut trees = Vec::with_capacity(self.n_estimators());

        for k in 0..self.n_estimators() {
            let weights = if self.bootstrap() {
                bootstrap_weights(dataset, draws, &mut rng)
            } else {
                Array1::from_shape_fn(nsamples, |i| dataset.weight_for(i))
            };

            let resample = DatasetBase::new(records.view(), targets.view())
                .with_weights(weights)
                .with_feature_names(feature_names.clone());

            let tree_params = self.tree_params(rng.gen::<u64>()).check()?;
            let tree = tree_params.fit(&resample)?;
            debug!(
                "fitted tree {} of {} with {} leaves",
                k + 1,
                self.n_estimators(),
                tree.num_leaves()
            );

            trees.push(tree);
        }

        Ok(RandomForestRegressor {
            trees,
            num_features: records.ncols(),
        })
    }
}

/// Draws `draws` samples with replacement and returns how often each sample was drawn, scaled by
/// its weight in `dataset`
fn bootstrap_weights<R: Records, T, G: Rng>(
    dataset: &DatasetBase<R, T>,
    draws: usize,
    rng: &mut G,
) -> Array1<f32> {
    let nsamples = dataset.records().nsamples();
    let mut counts = Array1::<f32>::zeros(nsamples);

    for _ in 0..draws {
        counts[rng.gen_range(0..nsamples)] += 1.0;
    }

    counts
        .indexed_iter_mut()
        .for_each(|(i, c)| *c *= dataset.weight_for(i));

    counts
}

impl<F: Float> RandomForestRegressor<F> {
    /// The member trees, in the order in which they were fitted
    pub fn trees(&self) -> &[DecisionTreeRegressor<F>] {
        &self.trees
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the forest was fitted on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Return the impurity-based feature importances
    ///
    /// All values lie in `[0, 1]` and sum to one, unless no tree found a single split, in which
    /// case all of them are zero.
    pub fn feature_importances(&self) -> Vec<F> {
        let mut importances = vec![F::zero(); self.num_features];
        let mut splitting_trees = 0;

        for tree in self.trees.iter().filter(|tree| !tree.root_node().is_leaf()) {
            for (total, importance) in importances.iter_mut().zip(tree.feature_importance()) {
                *total += importance;
            }
            splitting_trees += 1;
        }

        if splitting_trees == 0 {
            return importances;
        }

        let n = F::cast(splitting_trees);
        importances.iter_mut().for_each(|x| *x /= n);

        let sum: F = importances.iter().cloned().sum();
        if sum > F::zero() {
            importances.iter_mut().for_each(|x| *x /= sum);
        }

        importances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaxFeatures;
    use approx::assert_abs_diff_eq;
    use carebill::{metrics::Regression, Dataset};
    use ndarray::{array, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::SmallRng;

    fn step_dataset(n: usize) -> Dataset<f64, f64> {
        let mut rng = SmallRng::seed_from_u64(42);
        let records = Array2::random_using((n, 3), Uniform::new(0., 10.), &mut rng);
        let targets = records.column(0).mapv(|x| if x < 5. { 10. } else { 30. })
            + records.column(2).mapv(|x| 0.01 * x);

        Dataset::new(records, targets).with_feature_names(vec!["step", "noise", "drift"])
    }

    #[test]
    fn bootstrap_weights_count_draws() {
        let dataset = Dataset::new(Array2::<f64>::zeros((10, 1)), Array1::<f64>::zeros(10));
        let weights = bootstrap_weights(&dataset, 25, &mut StdRng::seed_from_u64(0));

        assert_eq!(weights.len(), 10);
        assert_abs_diff_eq!(weights.sum(), 25.);
        assert!(weights.iter().all(|w| w.fract() == 0.));
    }

    #[test]
    fn bootstrap_weights_scale_sample_weights() {
        let dataset = Dataset::new(Array2::<f64>::zeros((4, 1)), Array1::<f64>::zeros(4))
            .with_weights(array![0., 0., 0., 2.]);
        let weights = bootstrap_weights(&dataset, 50, &mut StdRng::seed_from_u64(3));

        assert_abs_diff_eq!(weights.slice(ndarray::s![..3]).sum(), 0.);
        assert!(weights[3] > 0. && weights[3] % 2. == 0.);
    }

    #[test]
    fn fits_the_requested_number_of_trees() {
        let dataset = step_dataset(200);
        let forest = RandomForestRegressor::params()
            .n_estimators(15)
            .max_depth(Some(2))
            .fit(&dataset)
            .unwrap();

        assert_eq!(forest.n_estimators(), 15);
        assert_eq!(forest.num_features(), 3);
        for tree in forest.trees() {
            assert!(tree.max_depth() <= 2);
            assert!(tree.num_leaves() <= 4);
        }
    }

    #[test]
    fn prediction_is_the_mean_of_the_trees() {
        let dataset = step_dataset(100);
        let forest = RandomForestRegressor::params()
            .n_estimators(7)
            .max_depth(Some(3))
            .fit(&dataset)
            .unwrap();

        let mut expected = Array1::<f64>::zeros(dataset.nsamples());
        for tree in forest.trees() {
            expected += &tree.predict(dataset.records());
        }
        expected /= 7.;

        assert_abs_diff_eq!(forest.predict(&dataset), expected, epsilon = 1e-9);
    }

    #[test]
    fn learns_a_step_function() {
        let dataset = step_dataset(300);
        let forest = RandomForestRegressor::params()
            .n_estimators(20)
            .max_depth(Some(2))
            .fit(&dataset)
            .unwrap();

        let score = forest.predict(&dataset).r2(dataset.targets());
        assert!(score > 0.95, "r2 was {}", score);

        let importances = forest.feature_importances();
        assert_abs_diff_eq!(importances.iter().sum::<f64>(), 1., epsilon = 1e-9);
        assert!(importances.iter().all(|x| (0. ..=1.).contains(x)));
        assert!(importances[0] > 0.9);
    }

    #[test]
    fn same_seed_same_forest() {
        let dataset = step_dataset(120);
        let params = RandomForestRegressor::params()
            .n_estimators(10)
            .max_depth(Some(2))
            .max_features(MaxFeatures::Sqrt);

        let a = params.fit(&dataset).unwrap();
        let b = params.fit(&dataset).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&dataset), b.predict(&dataset));

        let c = params.seed(7).fit(&dataset).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn without_bootstrap_the_trees_agree() {
        let dataset = step_dataset(80);
        let forest = RandomForestRegressor::params()
            .n_estimators(4)
            .max_depth(Some(2))
            .bootstrap(false)
            .fit(&dataset)
            .unwrap();

        let first = forest.trees()[0].predict(dataset.records());
        for tree in forest.trees() {
            assert_abs_diff_eq!(tree.predict(dataset.records()), first, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_targets_have_zero_importances() {
        let dataset = Dataset::new(
            array![[1., 2.], [2., 3.], [3., 4.], [4., 5.]],
            array![7., 7., 7., 7.],
        );
        let forest = RandomForestRegressor::params()
            .n_estimators(5)
            .fit(&dataset)
            .unwrap();

        assert_eq!(forest.feature_importances(), vec![0., 0.]);
        assert_abs_diff_eq!(forest.predict(&dataset), array![7., 7., 7., 7.]);
    }

    #[test]
    fn empty_training_sets_are_rejected() {
        let dataset = Dataset::new(Array2::<f64>::zeros((0, 3)), Array1::<f64>::zeros(0));
        let result = RandomForestRegressor::params().fit(&dataset);

        assert!(matches!(result, Err(Error::NotEnoughSamples)));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let dataset = Dataset::new(array![[1.], [f64::NAN]], array![1., 2.]);
        let result = RandomForestRegressor::params().fit(&dataset);

        assert!(matches!(result, Err(Error::NonFiniteValues)));
    }
}
