use carebill::{
    error::{Error, Result},
    Float, ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::DecisionTreeRegressor;

/// The number of features examined when looking for the best split of a node
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaxFeatures {
    /// Every feature is examined, in a random order drawn per node
    All,
    /// `floor(sqrt(n_features))`, at least one
    Sqrt,
    /// `floor(log2(n_features))`, at least one
    Log2,
    /// `floor(fraction * n_features)`, at least one. The fraction has to lie in `(0, 1]`.
    Fraction(f32),
}

impl MaxFeatures {
    /// Number of features to examine out of `n_features`
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match *self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Fraction(fraction) => (fraction as f64 * n_features as f64) as usize,
        };

        n.max(1).min(n_features)
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [regression tree](struct.DecisionTreeRegressor.html).
///
/// ### Example
///
/// ```rust
/// use carebill::prelude::*;
/// use carebill_trees::{DecisionTreeRegressor, MaxFeatures};
/// use ndarray::array;
///
/// // Initialize the default set of parameters and set the desired values
/// let params = DecisionTreeRegressor::params()
///     .max_depth(Some(2))
///     .max_features(MaxFeatures::All)
///     .seed(7);
///
/// let dataset = Dataset::new(array![[1.], [2.], [3.], [4.]], array![1., 1., 5., 5.]);
/// let tree = params.fit(&dataset).unwrap();
///
/// assert_eq!(tree.predict(&array![[1.5], [3.5]]), array![1., 5.]);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionTreeRegressorValidParams<F> {
    max_depth: Option<usize>,
    min_weight_split: f32,
    min_weight_leaf: f32,
    min_impurity_decrease: F,
    max_features: MaxFeatures,
    seed: u64,
}

impl<F: Float> DecisionTreeRegressorValidParams<F> {
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
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

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionTreeRegressorParams<F>(DecisionTreeRegressorValidParams<F>);

impl<F: Float> DecisionTreeRegressorParams<F> {
    pub fn new() -> Self {
        Self(DecisionTreeRegressorValidParams {
            max_depth: None,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            min_impurity_decrease: F::zero(),
            max_features: MaxFeatures::All,
            seed: 42,
        })
    }

    /// Sets the optional limit to the depth of the tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the minimum weight of samples required to split a node.
    ///
    /// If the observations do not have associated weights, this value represents
    /// the minimum number of samples required to split a node.
    pub fn min_weight_split(mut self, min_weight_split: f32) -> Self {
        self.0.min_weight_split = min_weight_split;
        self
    }

    /// Sets the minimum weight of samples that a split has to place in each leaf
    ///
    /// If the observations do not have associated weights, this value represents
    /// the minimum number of samples that a split has to place in each leaf.
    pub fn min_weight_leaf(mut self, min_weight_leaf: f32) -> Self {
        self.0.min_weight_leaf = min_weight_leaf;
        self
    }

    /// Sets the minimum weighted decrease in squared error that a split needs to bring in order
    /// for it to be applied
    pub fn min_impurity_decrease(mut self, min_impurity_decrease: F) -> Self {
        self.0.min_impurity_decrease = min_impurity_decrease;
        self
    }

    /// Sets the number of features examined per node
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Sets the seed of the generator which orders and subsamples the features of every node
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float> Default for DecisionTreeRegressorParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> DecisionTreeRegressor<F> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `max_depth = None`
    /// * `min_weight_split = 2.0`
    /// * `min_weight_leaf = 1.0`
    /// * `min_impurity_decrease = 0.0`
    /// * `max_features = MaxFeatures::All`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> DecisionTreeRegressorParams<F> {
        DecisionTreeRegressorParams::new()
    }
}

impl<F: Float> ParamGuard for DecisionTreeRegressorParams<F> {
    type Checked = DecisionTreeRegressorValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.max_depth == Some(0) {
            Err(Error::Parameters(
                "Maximal depth should be at least one".to_string(),
            ))
        } else if !(self.0.min_weight_leaf > 0.0) {
            Err(Error::Parameters(format!(
                "Minimum leaf weight should be positive, but was {}",
                self.0.min_weight_leaf
            )))
        } else if !(self.0.min_weight_split >= 0.0) {
            Err(Error::Parameters(format!(
                "Minimum split weight should not be negative, but was {}",
                self.0.min_weight_split
            )))
        } else if !(self.0.min_impurity_decrease >= F::zero()) {
            Err(Error::Parameters(format!(
                "Minimum impurity decrease should not be negative, but was {}",
                self.0.min_impurity_decrease
            )))
        } else if let MaxFeatures::Fraction(fraction) = self.0.max_features {
            if fraction > 0.0 && fraction <= 1.0 {
                Ok(&self.0)
            } else {
                Err(Error::Parameters(format!(
                    "Feature fraction should lie in (0, 1], but was {}",
                    fraction
                )))
            }
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
