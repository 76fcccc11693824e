//! Data loader stage

use std::path::Path;

use carebill::table::Table;
use log::info;

use crate::error::Result;

/// Reads the patient records at `path`
pub fn load_dataset(path: &Path) -> Result<Table> {
    let table = carebill_datasets::load(path)?;
    info!(
        "{} has {} rows and columns {:?}",
        path.display(),
        table.nrows(),
        table.column_names()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn missing_files_are_data_access_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("absent.csv")).unwrap_err();

        assert!(matches!(err, PipelineError::DataAccess(_)));
    }

    #[test]
    fn reads_typed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, "Age,Gender\n30,Male\n45,Female\n").unwrap();

        let table = load_dataset(&path).unwrap();
        assert_eq!(table.nrows(), 2);
        assert!(table.column("Age").unwrap().is_numeric());
    }
}
