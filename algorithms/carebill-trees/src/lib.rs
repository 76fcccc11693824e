//!
//! # Regression trees
//! `carebill-trees` provides a weighted CART regression tree, the building block of the random
//! forest in `carebill-ensemble`.
//!
//! # The big picture
//!
//! A regression tree partitions the feature space with axis-aligned splits and predicts the
//! weighted mean target of the training samples that end up in each leaf. Sample weights make
//! bootstrap resampling cheap: a resampled dataset is the original one with every row weighted by
//! how often it was drawn.
//!
//! # Current state
//!
//! `carebill-trees` provides an [implementation](DecisionTreeRegressor) of single-tree fitting
//! for regression with a squared-error criterion, optional per-node feature subsampling and
//! impurity-based feature importances.
//!

mod decision_trees;

pub use decision_trees::*;

pub use carebill::error::Result;
