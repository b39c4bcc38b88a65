//! # Expression Data Loading and Validation
//!
//! This module is the exclusive entry point for the normalized expression
//! matrix. Its responsibility is to read the matrix CSV produced upstream,
//! validate it against a strict schema, and transform it into the `ndarray`
//! structure the statistical core works on.
//!
//! - Strict schema: a header row of sample identifiers (the first header cell
//!   is the row-index label and is ignored), then one row per gene or
//!   transcript: identifier followed by one numeric value per sample.
//! - User-centric errors: failures are assumed to be input errors, and
//!   [`FormatError`] is designed to give actionable feedback.
//! - Values must be finite and non-negative; normalization happens upstream
//!   and this loader only enforces the resulting invariant.

use ahash::AHashMap;
use ndarray::{Array2, ArrayView1};
use std::path::Path;
use thiserror::Error;

/// A format violation in any of the file-based inputs.
///
/// Shared by the expression-matrix loader and the interaction-table parser:
/// both consume curated tabular artifacts and fail the run on malformed input.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("the required column '{column}' was not found in '{path}'")]
    MissingColumn { path: String, column: String },
    #[error("'{path}' must have at least two columns (regulator, target)")]
    TooFewColumns { path: String },
    #[error("the expression matrix header lists no sample identifiers")]
    NoSamples,
    #[error("the expression matrix contains no data rows")]
    NoRows,
    #[error("row '{id}' appears more than once in the expression matrix")]
    DuplicateRow { id: String },
    #[error("row '{id}' has {found} values but the header lists {expected} samples")]
    RaggedRow {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("row '{id}', sample '{sample}': '{value}' is not a valid number")]
    InvalidNumeric {
        id: String,
        sample: String,
        value: String,
    },
    #[error("row '{id}', sample '{sample}': value {value} is negative or non-finite")]
    InvalidValue { id: String, sample: String, value: f64 },
}

/// The normalized expression matrix: one row per gene/transcript identifier,
/// one column per sample, identical sample ordering across rows.
///
/// Built once per run and treated as immutable by every downstream stage.
#[derive(Debug)]
pub struct ExpressionMatrix {
    samples: Vec<String>,
    ids: Vec<String>,
    index: AHashMap<String, usize>,
    values: Array2<f64>,
}

impl ExpressionMatrix {
    /// Assembles a matrix from parsed rows, enforcing the rectangular,
    /// finite, non-negative invariants.
    pub fn from_rows(
        samples: Vec<String>,
        rows: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, FormatError> {
        if samples.is_empty() {
            return Err(FormatError::NoSamples);
        }
        if rows.is_empty() {
            return Err(FormatError::NoRows);
        }

        let n_samples = samples.len();
        let mut ids = Vec::with_capacity(rows.len());
        let mut index = AHashMap::with_capacity(rows.len());
        let mut flat = Vec::with_capacity(rows.len() * n_samples);

        for (id, values) in rows {
            if values.len() != n_samples {
                return Err(FormatError::RaggedRow {
                    id,
                    expected: n_samples,
                    found: values.len(),
                });
            }
            for (value, sample) in values.iter().zip(&samples) {
                if !value.is_finite() || *value < 0.0 {
                    return Err(FormatError::InvalidValue {
                        id,
                        sample: sample.clone(),
                        value: *value,
                    });
                }
            }
            if index.insert(id.clone(), ids.len()).is_some() {
                return Err(FormatError::DuplicateRow { id });
            }
            ids.push(id);
            flat.extend_from_slice(&values);
        }

        let values = Array2::from_shape_vec((ids.len(), n_samples), flat)
            .expect("row dimensions were validated above");
        Ok(Self {
            samples,
            ids,
            index,
            values,
        })
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.samples
    }

    pub fn row_ids(&self) -> &[String] {
        &self.ids
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The expression vector for `id`, or `None` when the identifier is not a
    /// row of the matrix.
    pub fn row(&self, id: &str) -> Option<ArrayView1<'_, f64>> {
        self.index.get(id).map(|&i| self.values.row(i))
    }
}

/// Loads and validates the expression matrix from a CSV file.
pub fn load_expression_matrix(path: &Path) -> Result<ExpressionMatrix, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    // The first header cell names the index column and carries no sample.
    let samples: Vec<String> = reader
        .headers()?
        .iter()
        .skip(1)
        .map(|s| s.trim().to_string())
        .collect();
    if samples.is_empty() {
        return Err(FormatError::NoSamples);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let id = record
            .get(0)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let mut values = Vec::with_capacity(samples.len());
        for (field, sample) in record.iter().skip(1).zip(&samples) {
            let value: f64 = field.trim().parse().map_err(|_| FormatError::InvalidNumeric {
                id: id.clone(),
                sample: sample.clone(),
                value: field.to_string(),
            })?;
            values.push(value);
        }
        if record.len() != samples.len() + 1 {
            return Err(FormatError::RaggedRow {
                id,
                expected: samples.len(),
                found: record.len().saturating_sub(1),
            });
        }
        rows.push((id, values));
    }

    let matrix = ExpressionMatrix::from_rows(samples, rows)?;
    log::info!(
        "loaded expression matrix: {} rows x {} samples from {}",
        matrix.n_rows(),
        matrix.n_samples(),
        path.display()
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_well_formed_matrix() {
        let file = write_csv("gene,s1,s2,s3\nL1,1.0,2.0,3.0\nM1,0.5,1.5,2.5\n");
        let matrix = load_expression_matrix(file.path()).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_samples(), 3);
        assert_eq!(matrix.sample_ids(), &["s1", "s2", "s3"]);
        assert!(matrix.contains("L1"));
        assert!(!matrix.contains("G1"));

        let row = matrix.row("M1").unwrap();
        assert_abs_diff_eq!(row[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(row[2], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn rejects_negative_values() {
        let file = write_csv("gene,s1,s2\nL1,1.0,-2.0\n");
        let err = load_expression_matrix(file.path()).unwrap_err();
        match err {
            FormatError::InvalidValue { id, sample, .. } => {
                assert_eq!(id, "L1");
                assert_eq!(sample, "s2");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_values() {
        let file = write_csv("gene,s1,s2\nL1,1.0,abc\n");
        let err = load_expression_matrix(file.path()).unwrap_err();
        assert!(matches!(err, FormatError::InvalidNumeric { .. }));
    }

    #[test]
    fn rejects_ragged_rows() {
        let file = write_csv("gene,s1,s2,s3\nL1,1.0,2.0\n");
        let err = load_expression_matrix(file.path()).unwrap_err();
        match err {
            FormatError::RaggedRow { id, expected, found } => {
                assert_eq!(id, "L1");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected RaggedRow, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_row_ids() {
        let file = write_csv("gene,s1,s2\nL1,1.0,2.0\nL1,3.0,4.0\n");
        let err = load_expression_matrix(file.path()).unwrap_err();
        assert!(matches!(err, FormatError::DuplicateRow { .. }));
    }
}
