//! One-hot encoding of categorical columns

use std::cmp::Ordering;
use std::collections::HashMap;

use carebill::table::{Column, ColumnValues, Table};
use log::debug;
use ndarray::{Array2, ArrayViewMut2, Axis};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What to do with a category that was not seen during fitting
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleUnknown {
    /// Encode the value as an all-zero block
    Ignore,
    /// Fail the transformation
    Error,
}

/// One-hot encoder: learns the set of categories of each column of a table and produces a
/// [FittedOneHotEncoder] that maps every value to an indicator block.
///
/// ### Attributes
///
/// * `handle_unknown`: behaviour for categories that were not seen during fitting. Defaults to
///   [HandleUnknown::Error].
///
/// Categories of text columns are sorted lexicographically, those of numeric columns by value.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        OneHotEncoder {
            handle_unknown: HandleUnknown::Error,
        }
    }
}

impl OneHotEncoder {
    pub fn handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Learns the categories of the columns `columns` of `table`
    ///
    /// Returns an error if one of the columns does not exist.
    pub fn fit<S: AsRef<str>>(&self, table: &Table, columns: &[S]) -> Result<FittedOneHotEncoder> {
        let mut names = Vec::with_capacity(columns.len());
        let mut categories = Vec::with_capacity(columns.len());

        for name in columns {
            let column = lookup(table, name.as_ref())?;
            let learned = sorted_categories(column);
            debug!(
                "column `{}` has {} categories",
                column.name(),
                learned.len()
            );

            names.push(column.name().to_string());
            categories.push(learned);
        }

        let index: Vec<HashMap<String, usize>> = categories
            .iter()
            .map(|cats| {
                cats.iter()
                    .enumerate()
                    .map(|(i, cat)| (cat.clone(), i))
                    .collect()
            })
            .collect();

        Ok(FittedOneHotEncoder {
            columns: names,
            categories,
            index,
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Maps the values of the fitted columns to concatenated indicator blocks. Block `j` has one
/// column per category learned for column `j`, in the order returned by
/// [categories](FittedOneHotEncoder::categories).
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    index: Vec<HashMap<String, usize>>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Names of the encoded columns, in block order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Learned categories, one sorted list per encoded column
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    pub fn handle_unknown_policy(&self) -> HandleUnknown {
        self.handle_unknown
    }

    /// Number of output columns, the total number of learned categories
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Names of the output columns, `<column>_<category>`
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |cat| format!("{}_{}", column, cat)))
            .collect()
    }

    /// Encodes the fitted columns of `table` into an array of shape
    /// `(table.nrows(), n_features_out)`
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let mut encoded = Array2::zeros((table.nrows(), self.n_features_out()));
        self.transform_into(table, encoded.view_mut())?;

        Ok(encoded)
    }

    /// Writes the encoding of `table` into `out`, which must have `n_features_out` zeroed columns
    pub(crate) fn transform_into(&self, table: &Table, mut out: ArrayViewMut2<f64>) -> Result<()> {
        let mut offset = 0;

        for ((name, cats), index) in self.columns.iter().zip(&self.categories).zip(&self.index) {
            let column = lookup(table, name)?;

            for (row, mut target) in out.axis_iter_mut(Axis(0)).enumerate() {
                let value = column.display(row);
                match index.get(&value) {
                    Some(&pos) => target[offset + pos] = 1.0,
                    None if self.handle_unknown == HandleUnknown::Ignore => {}
                    None => {
                        return Err(Error::UnknownCategory {
                            column: name.clone(),
                            value,
                        })
                    }
                }
            }

            offset += cats.len();
        }

        Ok(())
    }
}

fn lookup<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

/// Distinct values of a column in ascending order
fn sorted_categories(column: &Column) -> Vec<String> {
    match column.values() {
        ColumnValues::Int(values) => {
            let mut values = values.clone();
            values.sort_unstable();
            values.dedup();
            values.iter().map(|x| x.to_string()).collect()
        }
        ColumnValues::Float(values) => {
            let mut values = values.clone();
            values.sort_by(|a, b| compare_nan_last(*a, *b));
            values.dedup_by(|a, b| a == b || (a.is_nan() && b.is_nan()));
            values.iter().map(|x| x.to_string()).collect()
        }
        ColumnValues::Str(values) => {
            let mut values = values.clone();
            values.sort_unstable();
            values.dedup();
            values
        }
    }
}

/// Total order on floats with `NaN` after every number
fn compare_nan_last(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}
