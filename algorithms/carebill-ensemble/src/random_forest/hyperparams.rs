use carebill::{
    error::{Error, Result},
    Float, ParamGuard,
};
use carebill_trees::{DecisionTreeRegressor, DecisionTreeRegressorParams, MaxFeatures};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::RandomForestRegressor;

/// The set of hyperparameters that can be specified for fitting a
/// [random forest](struct.RandomForestRegressor.html).
///
/// The defaults mirror the usual random forest regressor: a hundred unrestricted trees, each fit
/// on a bootstrap resample of the full training set and allowed to look at every feature.
///
/// ### Example
///
/// ```rust
/// use carebill::prelude::*;
/// use carebill_ensemble::{MaxFeatures, RandomForestRegressor};
///
/// let params = RandomForestRegressor::<f64>::params()
///     .n_estimators(50)
///     .max_depth(Some(4))
///     .max_features(MaxFeatures::Sqrt)
///     .seed(7);
///
/// assert!(params.check_ref().is_ok());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomForestRegressorValidParams<F> {
    n_estimators: usize,
    max_depth: Option<usize>,
    bootstrap: bool,
    max_samples: Option<usize>,
    max_features: MaxFeatures,
    min_weight_split: f32,
    min_weight_leaf: f32,
    min_impurity_decrease: F,
    seed: u64,
}

impl<F: Float> RandomForestRegressorValidParams<F> {
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn max_samples(&self) -> Option<usize> {
        self.max_samples
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn min_weight_split(&self) -> f32 {
        self.min_weight_split
    }

    pub fn min_weight_leaf(&self) -> f32 {
        self.min_weight_leaf
    }

    pub fn min_impurity_decrease(&self) -> F {
        self.min_impurity_decrease
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Hyperparameters of a single member tree, seeded with `seed`
    pub(crate) fn tree_params(&self, seed: u64) -> DecisionTreeRegressorParams<F> {
        DecisionTreeRegressor::params()
            .max_depth(self.max_depth)
            .max_features(self.max_features)
            .min_weight_split(self.min_weight_split)
            .min_weight_leaf(self.min_weight_leaf)
            .min_impurity_decrease(self.min_impurity_decrease)
            .seed(seed)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomForestRegressorParams<F>(RandomForestRegressorValidParams<F>);

impl<F: Float> RandomForestRegressorParams<F> {
    pub fn new() -> Self {
        Self(RandomForestRegressorValidParams {
            n_estimators: 100,
            max_depth: None,
            bootstrap: true,
            max_samples: None,
            max_features: MaxFeatures::All,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            min_impurity_decrease: F::zero(),
            seed: 42,
        })
    }

    /// Sets the number of trees in the forest
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.0.n_estimators = n_estimators;
        self
    }

    /// Sets the optional limit to the depth of every tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Whether trees are fit on bootstrap resamples. Without bootstrapping every tree sees the
    /// full training set and the trees differ only in the order in which features are examined.
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.0.bootstrap = bootstrap;
        self
    }

    /// Sets the number of draws per bootstrap resample, `None` draws as many samples as the
    /// training set holds
    pub fn max_samples(mut self, max_samples: Option<usize>) -> Self {
        self.0.max_samples = max_samples;
        self
    }

    /// Sets the number of features examined per node
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Sets the minimum weight of samples required to split a node
    pub fn min_weight_split(mut self, min_weight_split: f32) -> Self {
        self.0.min_weight_split = min_weight_split;
        self
    }

    /// Sets the minimum weight of samples that a split has to place in each leaf
    pub fn min_weight_leaf(mut self, min_weight_leaf: f32) -> Self {
        self.0.min_weight_leaf = min_weight_leaf;
        self
    }

    pub fn min_impurity_decrease(mut self, min_impurity_decrease: F) -> Self {
        self.0.min_impurity_decrease = min_impurity_decrease;
        self
    }

    /// Sets the seed from which the resamples and the seeds of all trees are drawn
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float> Default for RandomForestRegressorParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> RandomForestRegressor<F> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `n_estimators = 100`
    /// * `max_depth = None`
    /// * `bootstrap = true`
    /// * `max_samples = None`
    /// * `max_features = MaxFeatures::All`
    /// * `min_weight_split = 2.0`
    /// * `min_weight_leaf = 1.0`
    /// * `min_impurity_decrease = 0.0`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> RandomForestRegressorParams<F> {
        RandomForestRegressorParams::new()
    }
}

impl<F: Float> ParamGuard for RandomForestRegressorParams<F> {
    type Checked = RandomForestRegressorValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_estimators == 0 {
            Err(Error::Parameters(
                "A forest needs at least one estimator".to_string(),
            ))
        } else if self.0.max_samples == Some(0) {
            Err(Error::Parameters(
                "Bootstrap resamples should draw at least one sample".to_string(),
            ))
        } else {
            // the member trees share the remaining hyperparameters
            self.0.tree_params(self.0.seed).check_ref()?;
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
