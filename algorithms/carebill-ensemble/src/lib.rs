//!
//! # Ensemble methods
//! `carebill-ensemble` combines many regression trees from `carebill-trees` into a single,
//! lower-variance model.
//!
//! # The big picture
//!
//! A random forest fits every tree on a bootstrap resample of the training set and lets each node
//! look at a random subset of the features. Averaging the trees smooths out the idiosyncrasies of
//! any single one of them. All randomness flows from one seed, so refitting the same data with the
//! same hyperparameters reproduces the forest exactly.
//!
//! # Current state
//!
//! `carebill-ensemble` provides a [random forest regressor](RandomForestRegressor) with
//! bootstrap resampling, per-node feature subsampling and impurity-based feature importances.
//!
//! ## Example
//!
//! ```
//! use carebill::prelude::*;
//! use carebill_ensemble::RandomForestRegressor;
//! use ndarray::{array, Array2};
//!
//! let records = Array2::from_shape_fn((40, 2), |(i, j)| (i * (j + 1)) as f64);
//! let targets = records.column(0).mapv(|x| if x < 20. { 1. } else { 3. });
//! let dataset = Dataset::new(records, targets);
//!
//! let forest = RandomForestRegressor::params()
//!     .n_estimators(10)
//!     .max_depth(Some(2))
//!     .fit(&dataset)
//!     .unwrap();
//!
//! let prediction = forest.predict(&array![[2., 4.], [35., 70.]]);
//! assert!(prediction[0] < 2. && prediction[1] > 2.);
//! ```

mod random_forest;

pub use carebill_trees::MaxFeatures;
pub use random_forest::*;

pub use carebill::error::Result;
