//! Weighted regression trees
//!
use std::collections::BTreeSet;

use log::trace;
use ndarray::{Array1, ArrayBase, ArrayView2, Axis, Data, Ix1, Ix2};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::DecisionTreeRegressorValidParams;
use super::NodeIter;
use carebill::{
    dataset::AsTargets,
    error::Error,
    error::Result,
    traits::*,
    DatasetBase, Float,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Two feature values closer than this are treated as equal and never separated by a split
const FEATURE_THRESHOLD: f64 = 1e-7;

/// RowMask tracks observations
///
/// The tree algorithm splits observations at a certain split value for a specific feature. The
/// left and right children can then only use a certain number of observations. In order to track
/// that, the observations are masked with a boolean vector, hiding all observations which are not
/// applicable in a lower tree.
struct RowMask {
    mask: Vec<bool>,
    nsamples: usize,
}

impl RowMask {
    /// Generates a RowMask showing the observations with a positive weight
    fn weighted<F: Float>(weights: &[F]) -> Self {
        let mask: Vec<bool> = weights.iter().map(|w| *w > F::zero()).collect();
        let nsamples = mask.iter().filter(|visible| **visible).count();

        RowMask { mask, nsamples }
    }

    /// Generates a RowMask where all observations are hidden
    fn none(nsamples: usize) -> Self {
        RowMask {
            mask: vec![false; nsamples],
            nsamples: 0,
        }
    }

    /// Sets the observation at the specified index as visible
    ///
    /// ### Panics
    ///
    /// If `idx` is out of bounds
    fn mark(&mut self, idx: usize) {
        self.mask[idx] = true;
        self.nsamples += 1;
    }
}

/// Sorted values of observations with indices (always for a particular feature)
struct SortedIndex<'a, F: Float> {
    feature_name: &'a str,
    sorted_values: Vec<(usize, F)>,
}

impl<'a, F: Float> SortedIndex<'a, F> {
    /// Sorts the values of a given feature in ascending order, keeping the original order of
    /// equal values
    fn of_array_column(
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        feature_idx: usize,
        feature_name: &'a str,
    ) -> Self {
        let sliced_column: Vec<F> = x.index_axis(Axis(1), feature_idx).to_vec();
        let mut pairs: Vec<(usize, F)> = sliced_column.into_iter().enumerate().collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Greater));

        SortedIndex {
            sorted_values: pairs,
            feature_name,
        }
    }
}

/// Weighted sums over the samples of a node, enough to derive the mean and the squared error
#[derive(Clone, Copy, Debug)]
struct Moments<F> {
    weight: F,
    sum: F,
    sum_sq: F,
}

impl<F: Float> Moments<F> {
    fn zero() -> Self {
        Moments {
            weight: F::zero(),
            sum: F::zero(),
            sum_sq: F::zero(),
        }
    }

    fn add(&mut self, weight: F, target: F) {
        self.weight += weight;
        self.sum += weight * target;
        self.sum_sq += weight * target * target;
    }

    fn sub(&self, other: &Self) -> Self {
        Moments {
            weight: self.weight - other.weight,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    fn mean(&self) -> F {
        self.sum / self.weight
    }

    /// Weighted mean squared deviation from the mean
    fn impurity(&self) -> F {
        let mean = self.mean();
        let variance = self.sum_sq / self.weight - mean * mean;

        variance.max(F::zero())
    }

    /// `sum^2 / weight`, maximizing the sum of both children of this quantity minimizes their
    /// weighted squared error
    fn proxy(&self) -> F {
        self.sum * self.sum / self.weight
    }
}

/// Everything a node needs to know about the training data
struct FitContext<'a, F: Float> {
    records: ArrayView2<'a, F>,
    targets: &'a [F],
    weights: &'a [F],
    sorted_indices: &'a [SortedIndex<'a, F>],
    params: &'a DecisionTreeRegressorValidParams<F>,
}

/// A candidate split
struct Split<F> {
    feature_idx: usize,
    split_value: F,
    proxy: F,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
/// A node in the regression tree
pub struct TreeNode<F> {
    feature_idx: usize,
    feature_name: String,
    split_value: F,
    impurity: F,
    impurity_decrease: F,
    weighted_samples: F,
    left_child: Option<Box<TreeNode<F>>>,
    right_child: Option<Box<TreeNode<F>>>,
    leaf_node: bool,
    prediction: F,
    depth: usize,
}

impl<F: Float> TreeNode<F> {
    fn leaf(moments: &Moments<F>, depth: usize) -> Self {
        TreeNode {
            feature_idx: 0,
            feature_name: "".to_string(),
            split_value: F::zero(),
            impurity: moments.impurity(),
            impurity_decrease: F::zero(),
            weighted_samples: moments.weight,
            left_child: None,
            right_child: None,
            leaf_node: true,
            prediction: moments.mean(),
            depth,
        }
    }

    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.leaf_node
    }

    /// Returns the depth of the node in the tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `Some(prediction)` for leaf nodes and `None` for internal nodes.
    pub fn prediction(&self) -> Option<F> {
        if self.is_leaf() {
            Some(self.prediction)
        } else {
            None
        }
    }

    /// Weighted mean target of the training samples which reached this node
    pub fn mean_target(&self) -> F {
        self.prediction
    }

    /// Weighted mean squared error of the training samples which reached this node
    pub fn impurity(&self) -> F {
        self.impurity
    }

    /// Total weight of the training samples which reached this node
    pub fn weighted_samples(&self) -> F {
        self.weighted_samples
    }

    /// Returns both children, first left then right
    pub fn children(&self) -> Vec<&Option<Box<TreeNode<F>>>> {
        vec![&self.left_child, &self.right_child]
    }

    /// Return the split (feature index, value) and its weighted impurity decrease
    pub fn split(&self) -> (usize, F, F) {
        (self.feature_idx, self.split_value, self.impurity_decrease)
    }

    /// Returns the name of the feature used in the split if the node is internal,
    /// `None` otherwise
    pub fn feature_name(&self) -> Option<&String> {
        if self.leaf_node {
            None
        } else {
            Some(&self.feature_name)
        }
    }

    /// Recursively fits the node
    fn fit(
        ctx: &FitContext<F>,
        mask: &RowMask,
        rng: &mut StdRng,
        depth: usize,
    ) -> Result<Self> {
        let mut moments = Moments::zero();
        for (i, _) in mask.mask.iter().enumerate().filter(|(_, visible)| **visible) {
            moments.add(ctx.weights[i], ctx.targets[i]);
        }

        let params = ctx.params;

        // return leaf when the node is too light, too deep or already pure
        if moments.weight < F::cast(params.min_weight_split())
            || moments.weight < F::cast(2.0 * params.min_weight_leaf())
            || params
                .max_depth()
                .map(|max_depth| depth >= max_depth)
                .unwrap_or(false)
            || moments.impurity() <= F::epsilon()
        {
            return Ok(Self::leaf(&moments, depth));
        }

        // visit the features in a fresh random order, examining at most `max_features` of them
        let n_features = ctx.sorted_indices.len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(params.max_features().resolve(n_features));

        let min_leaf = F::cast(params.min_weight_leaf());
        let threshold = F::cast(FEATURE_THRESHOLD);
        let mut best: Option<Split<F>> = None;

        for &feature_idx in &features {
            // (index of the observation, value of its `feature_idx` feature) for the
            // observations in this node, in ascending order of the value
            let values: Vec<(usize, F)> = ctx.sorted_indices[feature_idx]
                .sorted_values
                .iter()
                .filter(|(idx, _)| mask.mask[*idx])
                .copied()
                .collect();

            // We start by putting all available observations in the right subtree
            // and then move them one by one to the left subtree, evaluating every
            // position between two distinct values.
            let mut left = Moments::zero();
            for pos in 0..values.len().saturating_sub(1) {
                let (idx, value) = values[pos];
                left.add(ctx.weights[idx], ctx.targets[idx]);

                // equal values have to end up in the same subtree
                let next_value = values[pos + 1].1;
                if next_value <= value + threshold {
                    continue;
                }

                let right = moments.sub(&left);
                if left.weight < min_leaf || right.weight < min_leaf {
                    continue;
                }

                let proxy = left.proxy() + right.proxy();
                if best.as_ref().map_or(true, |b| proxy > b.proxy) {
                    // Take the midpoint from this value and the next one as split_value
                    let mut split_value = (value + next_value) / F::cast(2.0);
                    if split_value >= next_value || !split_value.is_finite() {
                        split_value = value;
                    }

                    best = Some(Split {
                        feature_idx,
                        split_value,
                        proxy,
                    });
                }
            }
        }

        let best = match best {
            Some(best) => best,
            None => return Ok(Self::leaf(&moments, depth)),
        };

        // determine new masks for the left and right subtrees
        let nsamples = ctx.records.nrows();
        let mut left_mask = RowMask::none(nsamples);
        let mut right_mask = RowMask::none(nsamples);
        let mut left = Moments::zero();

        for i in 0..nsamples {
            if mask.mask[i] {
                if ctx.records[(i, best.feature_idx)] <= best.split_value {
                    left_mask.mark(i);
                    left.add(ctx.weights[i], ctx.targets[i]);
                } else {
                    right_mask.mark(i);
                }
            }
        }
        let right = moments.sub(&left);

        // weighted decrease of squared error, the sum over all nodes gives the importance
        let impurity_decrease = moments.weight * moments.impurity()
            - left.weight * left.impurity()
            - right.weight * right.impurity();

        if impurity_decrease < params.min_impurity_decrease() * moments.weight {
            return Ok(Self::leaf(&moments, depth));
        }

        trace!(
            "depth {}: split feature {} at {} (weight {} -> {} / {})",
            depth,
            best.feature_idx,
            best.split_value,
            moments.weight,
            left.weight,
            right.weight
        );

        // Recurse and refit on left and right subtrees
        let left_child = TreeNode::fit(ctx, &left_mask, rng, depth + 1)?;
        let right_child = TreeNode::fit(ctx, &right_mask, rng, depth + 1)?;

        Ok(TreeNode {
            feature_idx: best.feature_idx,
            feature_name: ctx.sorted_indices[best.feature_idx].feature_name.to_owned(),
            split_value: best.split_value,
            impurity: moments.impurity(),
            impurity_decrease,
            weighted_samples: moments.weight,
            left_child: Some(Box::new(left_child)),
            right_child: Some(Box::new(right_child)),
            leaf_node: false,
            prediction: moments.mean(),
            depth,
        })
    }
}

/// A fitted regression tree.
///
/// ### Structure
/// A regression tree is a binary tree where:
/// * Each internal node specifies a decision, represented by a choice of a feature and a "split
///   value" such that all observations for which `feature <= split_value` is true fall in the left
///   subtree, while the others fall in the right subtree.
/// * leaf nodes make predictions, and their prediction is the weighted mean target of the training
///   observations in the leaf
///
/// ### Algorithm
///
/// Starting with a single root node, the tree is trained recursively by applying the following
/// rule to every node considered:
///
/// * Draw a random order of the features, keeping the first `max_features` of them
/// * Find the split value for each of these features which minimizes the weighted squared error
///   of the two resulting children, taking midpoints between consecutive distinct values
/// * Keep the best split over all examined features, the first one found wins ties
/// * If the split decreases the squared error by at least `min_impurity_decrease` per unit of
///   weight, two child nodes are generated; otherwise the node becomes a leaf
///
/// Observations with weight zero do not take part in the fit. A bootstrap sample can therefore be
/// expressed by weighting every observation with the number of times it was drawn.
///
/// ### Example
///
/// ```rust
/// use carebill::prelude::*;
/// use carebill_trees::DecisionTreeRegressor;
/// use ndarray::{array, Array1};
///
/// let dataset = Dataset::new(
///     array![[0., 1.], [1., 1.], [2., 0.], [3., 0.]],
///     array![10., 10., 30., 30.],
/// );
/// let tree = DecisionTreeRegressor::params().fit(&dataset).unwrap();
///
/// let prediction: Array1<f64> = tree.predict(&dataset);
/// assert_eq!(prediction.r2(&dataset.targets), 1.0);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeRegressor<F: Float> {
    root_node: TreeNode<F>,
    num_features: usize,
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for DecisionTreeRegressor<F>
{
    /// Make predictions for each row of a matrix of features `x`.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = make_prediction(&row, &self.root_node);
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for DecisionTreeRegressorValidParams<F>
where
    D: Data<Elem = F>,
    T: AsTargets<Elem = F>,
{
    type Object = DecisionTreeRegressor<F>;

    /// Fit a regression tree using `hyperparamters` on the dataset consisting of
    /// a matrix of features `x`, an array of targets `y` and optional sample weights.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        dataset.check_finite()?;

        let x = dataset.records().view();
        let targets = dataset.targets().as_targets().to_vec();
        let weights: Vec<F> = (0..x.nrows())
            .map(|i| F::cast(dataset.weight_for(i)))
            .collect();

        if weights.iter().any(|w| !w.is_finite() || *w < F::zero()) {
            return Err(Error::Parameters(
                "Sample weights have to be finite and non-negative".to_string(),
            ));
        }

        let all_idxs = RowMask::weighted(&weights);
        if all_idxs.nsamples == 0 {
            return Err(Error::NotEnoughSamples);
        }

        let feature_names = dataset.feature_names();
        let sorted_indices: Vec<_> = (0..(x.ncols()))
            .map(|feature_idx| {
                SortedIndex::of_array_column(&x, feature_idx, &feature_names[feature_idx])
            })
            .collect();

        let ctx = FitContext {
            records: x.view(),
            targets: &targets,
            weights: &weights,
            sorted_indices: &sorted_indices,
            params: self,
        };
        let mut rng = StdRng::seed_from_u64(self.seed());
        let root_node = TreeNode::fit(&ctx, &all_idxs, &mut rng, 0)?;

        Ok(DecisionTreeRegressor {
            root_node,
            num_features: x.ncols(),
        })
    }
}

impl<F: Float> DecisionTreeRegressor<F> {
    /// Create a node iterator in level-order (BFT)
    pub fn iter_nodes(&self) -> NodeIter<F> {
        NodeIter::new(&self.root_node)
    }

    /// Return the indices of the features used by at least one split, in ascending order
    pub fn features(&self) -> Vec<usize> {
        self.iter_nodes()
            .filter(|node| !node.is_leaf())
            .map(|node| node.feature_idx)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Return the total weighted impurity decrease for each feature
    pub fn total_impurity_decrease(&self) -> Vec<F> {
        let mut impurity_decrease = vec![F::zero(); self.num_features];

        for node in self.iter_nodes().filter(|node| !node.leaf_node) {
            impurity_decrease[node.feature_idx] += node.impurity_decrease;
        }

        impurity_decrease
    }

    /// Return the feature importance, i.e. the relative impurity decrease, for each feature
    ///
    /// The importances sum to one, unless the tree consists of a single leaf, in which case all
    /// of them are zero.
    pub fn feature_importance(&self) -> Vec<F> {
        let total_impurity_decrease = self.total_impurity_decrease();
        let sum: F = total_impurity_decrease.iter().cloned().sum();

        if sum > F::zero() {
            total_impurity_decrease
                .into_iter()
                .map(|x| x / sum)
                .collect()
        } else {
            vec![F::zero(); self.num_features]
        }
    }

    /// Return root node of the tree
    pub fn root_node(&self) -> &TreeNode<F> {
        &self.root_node
    }

    /// Return the number of features the tree was fitted on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Return max depth of the tree
    pub fn max_depth(&self) -> usize {
        self.iter_nodes()
            .fold(0, |max, node| usize::max(max, node.depth))
    }

    /// Return the number of leaves in this tree
    pub fn num_leaves(&self) -> usize {
        self.iter_nodes().filter(|node| node.is_leaf()).count()
    }
}

/// Predict the target of a sample &x recursively using the tree node `node`.
fn make_prediction<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix1>, node: &TreeNode<F>) -> F {
    if node.leaf_node {
        return node.prediction;
    }

    let child = if x[node.feature_idx] <= node.split_value {
        &node.left_child
    } else {
        &node.right_child
    };

    match child {
        Some(child) => make_prediction(x, child),
        None => node.prediction,
    }
}
