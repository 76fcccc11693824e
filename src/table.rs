//! Typed tables
//!
//! A [`Table`] is the in-memory form of a delimited file before any feature engineering happens.
//! Each [`Column`] carries a name and a homogeneous vector of values. Unlike the numeric
//! [`DatasetBase`](crate::DatasetBase), tables may hold text, which is what categorical encoders
//! consume.

use crate::error::{Error, Result};
use ndarray::Array1;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Values of a single column
///
/// Missing cells of a float column are stored as `NaN`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnValues::Int(_) => "integer",
            ColumnValues::Float(_) => "float",
            ColumnValues::Str(_) => "string",
        }
    }

    fn select(&self, indices: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Int(v) => ColumnValues::Int(indices.iter().map(|&i| v[i]).collect()),
            ColumnValues::Float(v) => ColumnValues::Float(indices.iter().map(|&i| v[i]).collect()),
            ColumnValues::Str(v) => {
                ColumnValues::Str(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// A named column of a table
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: ColumnValues) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self.values, ColumnValues::Str(_))
    }

    /// Numeric values of the column as `f64`, or `None` for text columns
    pub fn to_f64(&self) -> Option<Array1<f64>> {
        match &self.values {
            ColumnValues::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ColumnValues::Float(v) => Some(Array1::from(v.clone())),
            ColumnValues::Str(_) => None,
        }
    }

    /// Textual form of the value in row `idx`
    ///
    /// Categorical encoders compare categories by this representation, so integer and text
    /// columns can both be encoded.
    pub fn display(&self, idx: usize) -> String {
        match &self.values {
            ColumnValues::Int(v) => v[idx].to_string(),
            ColumnValues::Float(v) => v[idx].to_string(),
            ColumnValues::Str(v) => v[idx].clone(),
        }
    }

    /// Textual form of every value, in row order
    pub fn to_strings(&self) -> Vec<String> {
        match &self.values {
            ColumnValues::Str(v) => v.clone(),
            _ => (0..self.len()).map(|idx| self.display(idx)).collect(),
        }
    }
}

/// A collection of equally long, uniquely named columns
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table from columns
    ///
    /// Fails if two columns share a name or the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|other| other.name == column.name) {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(column) = columns.iter().find(|c| c.len() != expected) {
                return Err(Error::ColumnLength {
                    name: column.name.clone(),
                    expected,
                    found: column.len(),
                });
            }
        }

        Ok(Table { columns })
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Keep only the rows with the given indices, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.select(indices)))
                .collect(),
        }
    }

    /// First `n` rows of the table
    pub fn head(&self, n: usize) -> Table {
        let indices = (0..n.min(self.nrows())).collect::<Vec<_>>();
        self.select_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn patients() -> Table {
        Table::new(vec![
            Column::new("Age", ColumnValues::Int(vec![30, 45, 61])),
            Column::new(
                "Gender",
                ColumnValues::Str(vec!["Male".into(), "Female".into(), "Male".into()]),
            ),
            Column::new(
                "Billing Amount",
                ColumnValues::Float(vec![1200.5, 800.0, f64::NAN]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn shape_and_lookup() {
        let table = patients();

        assert_eq!(table.nrows(), 3);
        assert_eq!(table.ncols(), 3);
        assert_eq!(table.column_names(), vec!["Age", "Gender", "Billing Amount"]);
        assert!(table.column("Gender").is_some());
        assert!(table.column("Doctor").is_none());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::new("Age", ColumnValues::Int(vec![1])),
            Column::new("Age", ColumnValues::Int(vec![2])),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateColumn(name) if name == "Age"));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("Age", ColumnValues::Int(vec![1, 2])),
            Column::new("Gender", ColumnValues::Str(vec!["Male".into()])),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            Error::ColumnLength {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn numeric_conversion() {
        let table = patients();

        let age = table.column("Age").unwrap().to_f64().unwrap();
        assert_abs_diff_eq!(age, ndarray::array![30., 45., 61.]);

        let billing = table.column("Billing Amount").unwrap().to_f64().unwrap();
        assert!(billing[2].is_nan());

        assert!(table.column("Gender").unwrap().to_f64().is_none());
        assert!(!table.column("Gender").unwrap().is_numeric());
    }

    #[test]
    fn display_any_kind() {
        let table = patients();

        assert_eq!(table.column("Age").unwrap().to_strings(), vec!["30", "45", "61"]);
        assert_eq!(table.column("Gender").unwrap().display(1), "Female");
    }

    #[test]
    fn row_selection() {
        let table = patients();

        let picked = table.select_rows(&[2, 0]);
        assert_eq!(picked.nrows(), 2);
        assert_eq!(picked.column("Age").unwrap().values(), &ColumnValues::Int(vec![61, 30]));

        assert_eq!(table.head(10).nrows(), 3);
        assert!(table.head(0).is_empty());
        assert!(Table::default().is_empty());
    }
}
