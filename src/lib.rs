//! `carebill` is the common vocabulary of a small toolkit for predicting healthcare billing
//! amounts from patient records.
//!
//! Kin in spirit to Python's `scikit-learn`, it splits the problem into a core crate and a set of
//! algorithm crates:
//!
//! * this crate provides the [`DatasetBase`] container, the [`Fit`](traits::Fit) and
//!   [`Predict`](traits::Predict) traits, hyperparameter checking through [`ParamGuard`],
//!   regression metrics and the typed [`Table`](table::Table) frame that raw CSV data is loaded
//!   into;
//! * `carebill-datasets` reads tables from disk;
//! * `carebill-preprocessing` turns tables into numeric feature matrices;
//! * `carebill-trees` and `carebill-ensemble` fit regression trees and random forests;
//! * `carebill-train` wires all of them into the billing-amount training job.
//!
//! ## Example
//!
//! ```
//! use carebill::prelude::*;
//! use ndarray::array;
//!
//! let dataset = Dataset::new(array![[1., 2.], [3., 4.], [5., 6.]], array![1., 2., 3.]);
//! let (train, test) = dataset.split_with_ratio(2. / 3.);
//!
//! assert_eq!(train.nsamples(), 2);
//! assert_eq!(test.nsamples(), 1);
//! ```

pub mod benchmarks;
pub mod dataset;
pub mod error;
mod metrics_regression;
mod param_guard;
pub mod prelude;
pub mod table;
pub mod traits;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float};
pub use param_guard::ParamGuard;

/// Common metrics functions for regression
pub mod metrics {
    pub use crate::metrics_regression::Regression;
}
