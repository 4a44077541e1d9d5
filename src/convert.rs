//! Sparse to dense conversion of abundance matrices.

use crate::data::{AbundanceMatrix, MatrixData, Triple};
use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};
use std::collections::HashMap;

/// Materialize a dense `rows × columns` view of a matrix.
///
/// Dense input is copied as is. Sparse triples are scattered into a zero
/// matrix; when the same cell appears more than once the last triple wins.
/// Any triple outside the declared shape is a [`DivError::Shape`].
pub fn to_dense(matrix: &AbundanceMatrix) -> Result<DMatrix<f64>> {
    match matrix.data() {
        MatrixData::Dense(data) => Ok(data.clone()),
        MatrixData::Sparse(triples) => {
            let csc = to_csc(triples, matrix.shape())?;
            let mut dense = DMatrix::zeros(matrix.row_count(), matrix.column_count());
            for (col, col_vec) in csc.outer_iterator().enumerate() {
                for (row, &val) in col_vec.iter() {
                    dense[(row, col)] = val;
                }
            }
            Ok(dense)
        }
    }
}

/// Compressed sparse column form of a triple list, with duplicates resolved.
fn to_csc(triples: &[Triple], (n_rows, n_cols): (usize, usize)) -> Result<CsMat<f64>> {
    // TriMat sums duplicate cells, so resolve them here first.
    let mut cells: HashMap<(usize, usize), f64> = HashMap::with_capacity(triples.len());
    for t in triples {
        if t.row >= n_rows || t.col >= n_cols {
            return Err(DivError::Shape(format!(
                "triple ({}, {}) outside declared shape {}x{}",
                t.row, t.col, n_rows, n_cols
            )));
        }
        cells.insert((t.row, t.col), t.value);
    }

    let mut tri_mat = TriMat::with_capacity((n_rows, n_cols), cells.len());
    for ((row, col), val) in cells {
        tri_mat.add_triplet(row, col, val);
    }
    Ok(tri_mat.to_csc())
}

/// Copy one sample column out of a dense matrix.
pub fn slice_column(dense: &DMatrix<f64>, index: usize) -> Vec<f64> {
    dense.column(index).iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_sparse_to_dense() {
        let matrix = AbundanceMatrix::sparse(
            vec![(0, 0, 10.0), (2, 1, 3.0), (1, 2, 7.5)],
            ids("tax", 3),
            ids("mg", 3),
        )
        .unwrap();
        let dense = to_dense(&matrix).unwrap();

        assert_eq!(dense.shape(), (3, 3));
        assert_eq!(dense[(0, 0)], 10.0);
        assert_eq!(dense[(2, 1)], 3.0);
        assert_eq!(dense[(1, 2)], 7.5);
        assert_eq!(dense[(1, 1)], 0.0);
        assert_eq!(dense.iter().filter(|&&v| v != 0.0).count(), 3);
    }

    #[test]
    fn test_duplicate_triples_last_write_wins() {
        let matrix = AbundanceMatrix::sparse(
            vec![(0, 1, 4.0), (1, 0, 2.0), (0, 1, 9.0)],
            ids("tax", 2),
            ids("mg", 2),
        )
        .unwrap();
        let dense = to_dense(&matrix).unwrap();
        assert_eq!(dense[(0, 1)], 9.0);
        assert_eq!(dense[(1, 0)], 2.0);
    }

    #[test]
    fn test_out_of_bounds_triple_is_shape_error() {
        let matrix =
            AbundanceMatrix::sparse(vec![(0, 0, 1.0), (0, 2, 1.0)], ids("tax", 1), ids("mg", 2))
                .unwrap();
        assert!(matches!(to_dense(&matrix), Err(DivError::Shape(_))));

        let matrix = AbundanceMatrix::sparse(vec![(1, 0, 1.0)], ids("tax", 1), ids("mg", 1)).unwrap();
        assert!(matches!(to_dense(&matrix), Err(DivError::Shape(_))));
    }

    #[test]
    fn test_dense_is_identity() {
        let data = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let matrix = AbundanceMatrix::dense(data.clone(), ids("tax", 2), ids("mg", 3)).unwrap();
        assert_eq!(to_dense(&matrix).unwrap(), data);
    }

    #[test]
    fn test_empty_sparse_matrix() {
        let matrix = AbundanceMatrix::sparse(Vec::<Triple>::new(), ids("tax", 2), ids("mg", 0)).unwrap();
        let dense = to_dense(&matrix).unwrap();
        assert_eq!(dense.shape(), (2, 0));
    }

    #[test]
    fn test_slice_column() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(slice_column(&data, 1), vec![2.0, 4.0, 6.0]);
    }
}
