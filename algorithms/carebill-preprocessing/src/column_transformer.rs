//! Column transformer
//!
//! Selects a set of feature columns from a table, one-hot encodes the categorical ones and passes
//! the numeric ones through unchanged.

use carebill::table::Table;
use carebill::Dataset;
use ndarray::{s, Array2};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::numeric_column;
use crate::one_hot_encoding::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};

/// Column transformer: learns the category vocabulary of the categorical features and produces a
/// [FittedColumnTransformer].
///
/// The output matrix holds the indicator blocks of the categorical features first, in the order
/// in which they were listed, followed by the remaining features in their original order.
///
/// ### Attributes
///
/// * `features`: all columns taking part in the output
/// * `categorical`: the subset of `features` which is one-hot encoded
/// * `handle_unknown`: forwarded to the [OneHotEncoder]. Defaults to [HandleUnknown::Ignore].
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    categorical: Vec<String>,
    passthrough: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl ColumnTransformer {
    pub fn new<S: Into<String>, T: Into<String>>(features: Vec<S>, categorical: Vec<T>) -> Self {
        let categorical: Vec<String> = categorical.into_iter().map(Into::into).collect();
        let passthrough: Vec<String> = features
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| !categorical.contains(name))
            .collect();

        ColumnTransformer {
            categorical,
            passthrough,
            handle_unknown: HandleUnknown::Ignore,
        }
    }

    pub fn handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Learns the categories of the categorical features of `table`
    ///
    /// Returns an error if a feature is missing or a passthrough feature is not numeric.
    pub fn fit(&self, table: &Table) -> Result<FittedColumnTransformer> {
        for name in &self.passthrough {
            numeric_column(table, name)?;
        }

        let encoder = OneHotEncoder::default()
            .handle_unknown(self.handle_unknown)
            .fit(table, &self.categorical)?;

        Ok(FittedColumnTransformer {
            encoder,
            passthrough: self.passthrough.clone(),
        })
    }
}

/// Fitted column transformer, see [ColumnTransformer]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct FittedColumnTransformer {
    encoder: FittedOneHotEncoder,
    passthrough: Vec<String>,
}

impl FittedColumnTransformer {
    /// The fitted encoder of the categorical features
    pub fn encoder(&self) -> &FittedOneHotEncoder {
        &self.encoder
    }

    /// Features copied unchanged into the output
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    pub fn n_features_out(&self) -> usize {
        self.encoder.n_features_out() + self.passthrough.len()
    }

    /// Names of the output columns
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names_out();
        names.extend(self.passthrough.iter().cloned());
        names
    }

    /// Produces the feature matrix of `table`, with one row per table row
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let encoded = self.encoder.n_features_out();
        let mut matrix = Array2::zeros((table.nrows(), self.n_features_out()));

        self.encoder
            .transform_into(table, matrix.slice_mut(s![.., ..encoded]))?;

        for (i, name) in self.passthrough.iter().enumerate() {
            let values = numeric_column(table, name)?;
            matrix.column_mut(encoded + i).assign(&values);
        }

        Ok(matrix)
    }

    /// Produces a dataset with the feature matrix of `table` as records and the numeric column
    /// `target` as targets, labelled with the output feature names
    pub fn transform_dataset(&self, table: &Table, target: &str) -> Result<Dataset<f64, f64>> {
        let records = self.transform(table)?;
        let targets = numeric_column(table, target)?;

        if records.nrows() != targets.len() {
            return Err(Error::BaseCrate(carebill::error::Error::MismatchedShapes {
                records: records.nrows(),
                targets: targets.len(),
            }));
        }

        Ok(Dataset::new(records, targets).with_feature_names(self.feature_names_out()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use carebill::table::{Column, ColumnValues};
    use carebill::dataset::Records;
    use ndarray::array;

    fn strings(values: &[&str]) -> ColumnValues {
        ColumnValues::Str(values.iter().map(|x| x.to_string()).collect())
    }

    fn patients() -> Table {
        Table::new(vec![
            Column::new("Name", strings(&["Ann", "Bob", "Cid"])),
            Column::new("Age", ColumnValues::Int(vec![30, 62, 76])),
            Column::new("Gender", strings(&["Male", "Male", "Female"])),
            Column::new("Blood Type", strings(&["B-", "A+", "A-"])),
            Column::new("Medical Condition", strings(&["Cancer", "Obesity", "Obesity"])),
            Column::new(
                "Billing Amount",
                ColumnValues::Float(vec![18856.28, 33643.33, 27955.10]),
            ),
        ])
        .unwrap()
    }

    fn billing_transformer() -> ColumnTransformer {
        ColumnTransformer::new(
            vec!["Age", "Gender", "Blood Type", "Medical Condition"],
            vec!["Gender", "Blood Type", "Medical Condition"],
        )
    }

    #[test]
    fn encoded_blocks_come_before_passthrough() {
        let table = patients();
        let fitted = billing_transformer().fit(&table).unwrap();

        assert_eq!(
            fitted.feature_names_out(),
            vec![
                "Gender_Female",
                "Gender_Male",
                "Blood Type_A+",
                "Blood Type_A-",
                "Blood Type_B-",
                "Medical Condition_Cancer",
                "Medical Condition_Obesity",
                "Age",
            ]
        );

        let matrix = fitted.transform(&table).unwrap();
        assert_eq!(matrix.dim(), (3, 8));
        assert_abs_diff_eq!(
            matrix,
            array![
                [0., 1., 0., 0., 1., 1., 0., 30.],
                [0., 1., 1., 0., 0., 0., 1., 62.],
                [1., 0., 0., 1., 0., 0., 1., 76.],
            ]
        );
    }

    #[test]
    fn output_width_counts_every_category() {
        let table = patients();
        let fitted = billing_transformer().fit(&table).unwrap();

        let categories: usize = fitted.encoder().categories().iter().map(Vec::len).sum();
        assert_eq!(fitted.n_features_out(), 1 + categories);
        assert_eq!(fitted.passthrough(), &["Age".to_string()]);
    }

    #[test]
    fn unknown_categories_encode_to_zero_by_default() {
        let fitted = billing_transformer().fit(&patients()).unwrap();

        let unseen = Table::new(vec![
            Column::new("Age", ColumnValues::Int(vec![50])),
            Column::new("Gender", strings(&["Female"])),
            Column::new("Blood Type", strings(&["AB+"])),
            Column::new("Medical Condition", strings(&["Asthma"])),
        ])
        .unwrap();

        let matrix = fitted.transform(&unseen).unwrap();
        assert_abs_diff_eq!(matrix, array![[1., 0., 0., 0., 0., 0., 0., 50.]]);
    }

    #[test]
    fn strict_policy_rejects_unknown_categories() {
        let fitted = billing_transformer()
            .handle_unknown(HandleUnknown::Error)
            .fit(&patients())
            .unwrap();
        let unseen = Table::new(
            patients()
                .head(1)
                .columns()
                .iter()
                .map(|c| {
                    if c.name() == "Gender" {
                        Column::new("Gender", strings(&["Unknown"]))
                    } else {
                        c.clone()
                    }
                })
                .collect(),
        )
        .unwrap();

        assert!(matches!(
            fitted.transform(&unseen),
            Err(Error::UnknownCategory { .. })
        ));
    }

    #[test]
    fn missing_and_textual_features_are_schema_errors() {
        let table = patients();

        let missing = ColumnTransformer::new(vec!["Age", "Doctor"], vec!["Doctor"]).fit(&table);
        assert!(matches!(missing, Err(Error::MissingColumn(name)) if name == "Doctor"));

        let textual = ColumnTransformer::new(vec!["Name"], Vec::<String>::new()).fit(&table);
        assert!(matches!(textual, Err(Error::NonNumericColumn { .. })));
    }

    #[test]
    fn dataset_carries_targets_and_names() {
        let table = patients();
        let fitted = billing_transformer().fit(&table).unwrap();
        let dataset = fitted.transform_dataset(&table, "Billing Amount").unwrap();

        assert_eq!(dataset.nsamples(), 3);
        assert_eq!(dataset.nfeatures(), 8);
        assert_abs_diff_eq!(dataset.targets()[1], 33643.33);
        assert_eq!(dataset.feature_names()[7], "Age");

        let err = fitted.transform_dataset(&table, "Gender").unwrap_err();
        assert!(matches!(err, Error::NonNumericColumn { column, .. } if column == "Gender"));
    }
}
