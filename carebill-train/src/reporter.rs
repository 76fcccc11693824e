//! Reporter stage: metrics file and the feature importance table

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use carebill::table::Table;
use carebill_preprocessing::FittedColumnTransformer;
use log::warn;

use crate::config::LabelSource;
use crate::error::{PipelineError, Result};
use crate::trainer::Scores;

/// Importance of one labelled feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Writes both scores with one decimal, replacing any previous content of `path`
pub fn write_metrics(path: &Path, scores: &Scores) -> Result<()> {
    let io_error = |source: std::io::Error| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    writeln!(out, "Training variance explained: {:.1}%", scores.train).map_err(io_error)?;
    writeln!(out, "Test variance explained: {:.1}%", scores.test).map_err(io_error)?;
    out.flush().map_err(io_error)
}

/// Labels for the bars of the importance chart
pub fn importance_labels(
    table: &Table,
    transformer: &FittedColumnTransformer,
    source: LabelSource,
) -> Vec<String> {
    match source {
        LabelSource::DatasetColumns => table.column_names(),
        LabelSource::EncodedFeatures => transformer.feature_names_out(),
    }
}

/// Pairs labels and importances by position and sorts the pairs by decreasing importance
///
/// Pairs beyond the shorter of the two lists are dropped. Equal importances keep their relative
/// order.
pub fn importance_table(importances: &[f64], labels: &[String]) -> Vec<FeatureImportance> {
    if importances.len() != labels.len() {
        warn!(
            "{} importances but {} labels, the chart shows only the first {}",
            importances.len(),
            labels.len(),
            importances.len().min(labels.len())
        );
    }

    let mut rows: Vec<FeatureImportance> = labels
        .iter()
        .zip(importances)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn metrics_have_one_decimal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.txt");
        std::fs::write(&path, "stale content\nstale\nstale\n").unwrap();

        let scores = Scores {
            train: 12.345,
            test: -3.06,
        };
        write_metrics(&path, &scores).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Training variance explained: 12.3%\nTest variance explained: -3.1%\n"
        );
    }

    #[test]
    fn unwritable_metrics_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("metrics.txt");
        let scores = Scores {
            train: 1.0,
            test: 1.0,
        };

        let err = write_metrics(&path, &scores).unwrap_err();
        assert!(matches!(err, PipelineError::Io { path: p, .. } if p == path));
    }

    #[test]
    fn table_is_sorted_by_decreasing_importance() {
        let rows = importance_table(&[0.1, 0.6, 0.3], &labels(&["a", "b", "c"]));
        let order: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();

        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_their_order() {
        let rows = importance_table(&[0.25, 0.5, 0.25, 0.0], &labels(&["w", "x", "y", "z"]));
        let order: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();

        assert_eq!(order, vec!["x", "w", "y", "z"]);
    }

    #[test]
    fn pairs_are_cut_to_the_shorter_list() {
        let importances = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(importance_table(&importances, &labels(&["a", "b"])).len(), 2);
        assert_eq!(importance_table(&importances[..1], &labels(&["a", "b"])).len(), 1);
    }
}
