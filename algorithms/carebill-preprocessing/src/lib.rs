//! # Preprocessing
//! `carebill-preprocessing` turns [`Table`](carebill::table::Table)s into numeric feature
//! matrices.
//!
//! Each transformer is split into an unfitted part holding the options and a fitted part holding
//! what was learned from the data, so that the learned state can be inspected before anything is
//! transformed.
//!
//! ## Current state
//! * One-hot encoding of categorical columns
//! * Column transformer: one-hot encodes a set of categorical columns and passes the remaining
//!   numeric columns through
//!
//! ## Example
//!
//! ```
//! use carebill::table::{Column, ColumnValues, Table};
//! use carebill_preprocessing::ColumnTransformer;
//!
//! let table = Table::new(vec![
//!     Column::new("Age", ColumnValues::Int(vec![30, 45])),
//!     Column::new("Gender", ColumnValues::Str(vec!["Male".into(), "Female".into()])),
//! ])?;
//!
//! let transformer = ColumnTransformer::new(vec!["Age", "Gender"], vec!["Gender"]).fit(&table)?;
//! let matrix = transformer.transform(&table)?;
//!
//! assert_eq!(transformer.feature_names_out(), vec!["Gender_Female", "Gender_Male", "Age"]);
//! assert_eq!(matrix.row(0).to_vec(), vec![0., 1., 30.]);
//! # Ok::<(), carebill_preprocessing::Error>(())
//! ```

pub mod column_transformer;
pub mod error;
pub mod one_hot_encoding;

pub use column_transformer::{ColumnTransformer, FittedColumnTransformer};
pub use error::{Error, Result};
pub use one_hot_encoding::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};

use carebill::table::Table;
use ndarray::Array1;

/// Values of a numeric column as `f64`
///
/// Fails if the column is missing or holds text.
pub fn numeric_column(table: &Table, name: &str) -> Result<Array1<f64>> {
    let column = table
        .column(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))?;

    column.to_f64().ok_or_else(|| Error::NonNumericColumn {
        column: name.to_string(),
        kind: column.values().kind(),
    })
}
