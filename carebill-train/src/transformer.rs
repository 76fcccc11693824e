//! Feature transformer stage

use carebill::{table::Table, Dataset};
use carebill_preprocessing::{ColumnTransformer, FittedColumnTransformer, HandleUnknown};
use log::debug;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Feature matrix and target vector of a table, together with the transformer fitted on it
#[derive(Debug)]
pub struct Transformed {
    pub dataset: Dataset<f64, f64>,
    pub transformer: FittedColumnTransformer,
}

/// One-hot encodes the categorical features of `table`, passes the other features through and
/// pairs the result with the target column
///
/// Categories that the fitted transformer does not know are encoded as zeros.
pub fn transform_dataset(table: &Table, config: &PipelineConfig) -> Result<Transformed> {
    let transformer = ColumnTransformer::new(config.features.clone(), config.categorical.clone())
        .handle_unknown(HandleUnknown::Ignore)
        .fit(table)?;

    let dataset = transformer.transform_dataset(table, &config.target)?;
    debug!(
        "encoded {} features into {} columns",
        config.features.len(),
        transformer.n_features_out()
    );

    Ok(Transformed {
        dataset,
        transformer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use carebill::prelude::*;

    fn strings(values: &[&str]) -> ColumnValues {
        ColumnValues::Str(values.iter().map(|x| x.to_string()).collect())
    }

    fn patients() -> Table {
        Table::new(vec![
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

    #[test]
    fn produces_aligned_records_and_targets() {
        let transformed = transform_dataset(&patients(), &PipelineConfig::default()).unwrap();
        let dataset = transformed.dataset;

        // 2 genders + 3 blood types + 2 conditions + age
        assert_eq!(dataset.records().dim(), (3, 8));
        assert_eq!(dataset.targets().len(), 3);
        assert_eq!(dataset.records()[[2, 7]], 76.);
        assert_eq!(
            transformed.transformer.encoder().categories()[0],
            vec!["Female", "Male"]
        );
    }

    #[test]
    fn missing_feature_is_a_schema_error() {
        let table = Table::new(vec![Column::new("Age", ColumnValues::Int(vec![1]))]).unwrap();
        let err = transform_dataset(&table, &PipelineConfig::default()).unwrap_err();

        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn textual_target_is_a_schema_error() {
        let mut config = PipelineConfig::default();
        config.target = "Gender".to_string();

        let err = transform_dataset(&patients(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }
}
