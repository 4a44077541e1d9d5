//! Annotation-by-sample abundance matrix in sparse or dense encoding.

use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How the raw matrix values are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixType {
    /// `(row, col, value)` triples; unspecified cells are zero.
    Sparse,
    /// Fully populated `rows × columns` array.
    Dense,
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparse => f.write_str("sparse"),
            Self::Dense => f.write_str("dense"),
        }
    }
}

impl FromStr for MatrixType {
    type Err = DivError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse" => Ok(Self::Sparse),
            "dense" => Ok(Self::Dense),
            other => Err(DivError::Format(format!(
                "matrix_type must be 'sparse' or 'dense', got '{}'",
                other
            ))),
        }
    }
}

/// A single sparse cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triple {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl Triple {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        Self { row, col, value }
    }
}

impl From<(usize, usize, f64)> for Triple {
    fn from((row, col, value): (usize, usize, f64)) -> Self {
        Self { row, col, value }
    }
}

/// Raw matrix values as they were supplied.
#[derive(Debug, Clone)]
pub enum MatrixData {
    Sparse(Vec<Triple>),
    Dense(DMatrix<f64>),
}

/// An abundance matrix: annotations (rows) by samples (columns).
///
/// Immutable once built. Sparse triples are stored as supplied; bounds are
/// checked when a dense view is materialized (see [`crate::convert::to_dense`]).
#[derive(Debug, Clone)]
pub struct AbundanceMatrix {
    data: MatrixData,
    /// Declared `(rows, columns)`.
    shape: (usize, usize),
    /// Annotation identifiers (row names).
    row_ids: Vec<String>,
    /// Sample identifiers (column names).
    column_ids: Vec<String>,
    /// True total observation count per sample, when known.
    sample_totals: Vec<Option<u64>>,
    /// Raw column objects (BIOM column metadata), when known.
    column_metadata: Vec<Option<serde_json::Value>>,
}

impl AbundanceMatrix {
    /// Build a sparse matrix from triples.
    ///
    /// The shape is taken from the identifier lists. Values must be finite
    /// and non-negative, and sample ids unique.
    pub fn sparse<T: Into<Triple>>(
        triples: impl IntoIterator<Item = T>,
        row_ids: Vec<String>,
        column_ids: Vec<String>,
    ) -> Result<Self> {
        let triples: Vec<Triple> = triples.into_iter().map(Into::into).collect();
        for t in &triples {
            check_value(t.value, t.row, t.col)?;
        }
        Self::from_parts(MatrixData::Sparse(triples), row_ids, column_ids)
    }

    /// Build a dense matrix from an existing `DMatrix`.
    pub fn dense(data: DMatrix<f64>, row_ids: Vec<String>, column_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != row_ids.len() {
            return Err(DivError::DimensionMismatch {
                expected: nrows,
                actual: row_ids.len(),
            });
        }
        if ncols != column_ids.len() {
            return Err(DivError::DimensionMismatch {
                expected: ncols,
                actual: column_ids.len(),
            });
        }
        for row in 0..nrows {
            for col in 0..ncols {
                check_value(data[(row, col)], row, col)?;
            }
        }
        Self::from_parts(MatrixData::Dense(data), row_ids, column_ids)
    }

    /// Build a dense matrix from nested rows.
    ///
    /// Fails with a shape error unless there is exactly one inner vector per
    /// row id, each with one value per column id.
    pub fn dense_from_rows(
        rows: Vec<Vec<f64>>,
        row_ids: Vec<String>,
        column_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = (row_ids.len(), column_ids.len());
        if rows.len() != nrows {
            return Err(DivError::Shape(format!(
                "dense data has {} rows, declared {}",
                rows.len(),
                nrows
            )));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(DivError::Shape(format!(
                "dense row {} has {} values, declared {}",
                i,
                row.len(),
                ncols
            )));
        }
        let data = DMatrix::from_fn(nrows, ncols, |r, c| rows[r][c]);
        Self::dense(data, row_ids, column_ids)
    }

    fn from_parts(data: MatrixData, row_ids: Vec<String>, column_ids: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(column_ids.len());
        if let Some(dup) = column_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(DivError::Format(format!("duplicate sample id '{}'", dup)));
        }
        let n_cols = column_ids.len();
        Ok(Self {
            data,
            shape: (row_ids.len(), n_cols),
            row_ids,
            column_ids,
            sample_totals: vec![None; n_cols],
            column_metadata: vec![None; n_cols],
        })
    }

    /// Attach the true total observation count of each sample.
    pub fn with_sample_totals(mut self, totals: Vec<Option<u64>>) -> Result<Self> {
        if totals.len() != self.column_count() {
            return Err(DivError::DimensionMismatch {
                expected: self.column_count(),
                actual: totals.len(),
            });
        }
        self.sample_totals = totals;
        Ok(self)
    }

    /// Attach the raw column objects.
    pub fn with_column_metadata(mut self, metadata: Vec<Option<serde_json::Value>>) -> Result<Self> {
        if metadata.len() != self.column_count() {
            return Err(DivError::DimensionMismatch {
                expected: self.column_count(),
                actual: metadata.len(),
            });
        }
        self.column_metadata = metadata;
        Ok(self)
    }

    /// Number of annotations (rows).
    #[inline]
    pub fn row_count(&self) -> usize {
        self.shape.0
    }

    /// Number of samples (columns).
    #[inline]
    pub fn column_count(&self) -> usize {
        self.shape.1
    }

    /// Declared `(rows, columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Encoding of the raw data.
    pub fn matrix_type(&self) -> MatrixType {
        match self.data {
            MatrixData::Sparse(_) => MatrixType::Sparse,
            MatrixData::Dense(_) => MatrixType::Dense,
        }
    }

    /// Raw data as supplied.
    #[inline]
    pub fn data(&self) -> &MatrixData {
        &self.data
    }

    /// Annotation identifiers.
    #[inline]
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn column_ids(&self) -> &[String] {
        &self.column_ids
    }

    /// Column index of a sample.
    pub fn column_index_of(&self, sample_id: &str) -> Result<usize> {
        self.column_ids
            .iter()
            .position(|id| id == sample_id)
            .ok_or_else(|| DivError::NotFound(sample_id.to_string()))
    }

    /// True total observation count of a sample, if one was supplied.
    pub fn sample_total(&self, sample_id: &str) -> Result<Option<u64>> {
        let idx = self.column_index_of(sample_id)?;
        Ok(self.sample_totals[idx])
    }

    /// Totals for all samples in column order.
    pub fn sample_totals(&self) -> &[Option<u64>] {
        &self.sample_totals
    }

    /// Raw column object of a sample, if one was supplied.
    pub fn column_metadata(&self, sample_id: &str) -> Result<Option<&serde_json::Value>> {
        let idx = self.column_index_of(sample_id)?;
        Ok(self.column_metadata[idx].as_ref())
    }
}

fn check_value(value: f64, row: usize, col: usize) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DivError::Format(format!(
            "abundance at ({}, {}) must be a finite non-negative number, got {}",
            row, col, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn create_test_matrix() -> AbundanceMatrix {
        // 3 annotations × 2 samples
        AbundanceMatrix::sparse(
            vec![(0, 0, 10.0), (1, 0, 5.0), (2, 1, 7.0)],
            vec!["taxA".into(), "taxB".into(), "taxC".into()],
            vec!["mg1".into(), "mg2".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.row_count(), 3);
        assert_eq!(mat.column_count(), 2);
        assert_eq!(mat.shape(), (3, 2));
        assert_eq!(mat.matrix_type(), MatrixType::Sparse);
    }

    #[test]
    fn test_column_index_of() {
        let mat = create_test_matrix();
        assert_eq!(mat.column_index_of("mg2").unwrap(), 1);
        assert!(matches!(
            mat.column_index_of("mg9"),
            Err(DivError::NotFound(id)) if id == "mg9"
        ));
    }

    #[test]
    fn test_negative_value_rejected() {
        let result = AbundanceMatrix::sparse(vec![(0, 0, -1.0)], ids("r", 1), ids("c", 1));
        assert!(matches!(result, Err(DivError::Format(_))));
    }

    #[test]
    fn test_dense_dimension_mismatch() {
        let data = DMatrix::from_element(2, 2, 1.0);
        let result = AbundanceMatrix::dense(data, ids("r", 3), ids("c", 2));
        assert!(matches!(
            result,
            Err(DivError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_dense_from_rows_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let result = AbundanceMatrix::dense_from_rows(rows, ids("r", 2), ids("c", 2));
        assert!(matches!(result, Err(DivError::Shape(_))));

        let rows = vec![vec![1.0, 2.0]];
        let result = AbundanceMatrix::dense_from_rows(rows, ids("r", 2), ids("c", 2));
        assert!(matches!(result, Err(DivError::Shape(_))));
    }

    #[test]
    fn test_dense_from_rows_layout() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let mat = AbundanceMatrix::dense_from_rows(rows, ids("r", 2), ids("c", 3)).unwrap();
        assert_eq!(mat.matrix_type(), MatrixType::Dense);
        match mat.data() {
            MatrixData::Dense(d) => {
                assert_eq!(d[(0, 2)], 3.0);
                assert_eq!(d[(1, 0)], 4.0);
            }
            MatrixData::Sparse(_) => panic!("expected dense data"),
        }
    }

    #[test]
    fn test_sample_totals() {
        let mat = create_test_matrix()
            .with_sample_totals(vec![Some(1500), None])
            .unwrap();
        assert_eq!(mat.sample_total("mg1").unwrap(), Some(1500));
        assert_eq!(mat.sample_total("mg2").unwrap(), None);
        assert!(mat.sample_total("nope").is_err());

        let bad = create_test_matrix().with_sample_totals(vec![Some(1)]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_duplicate_sample_ids_rejected() {
        let result = AbundanceMatrix::sparse(
            vec![(0, 0, 10.0), (1, 1, 5.0)],
            ids("r", 2),
            vec!["s".into(), "s".into()],
        );
        assert!(matches!(result, Err(DivError::Format(msg)) if msg.contains("'s'")));

        let rows = vec![vec![10.0, 5.0], vec![0.0, 5.0]];
        let result = AbundanceMatrix::dense_from_rows(rows, ids("r", 2), vec!["s".into(), "s".into()]);
        assert!(matches!(result, Err(DivError::Format(_))));
    }

    #[test]
    fn test_matrix_type_parse() {
        assert_eq!("sparse".parse::<MatrixType>().unwrap(), MatrixType::Sparse);
        assert_eq!("dense".parse::<MatrixType>().unwrap(), MatrixType::Dense);
        assert!(matches!("csr".parse::<MatrixType>(), Err(DivError::Format(_))));
    }
}
