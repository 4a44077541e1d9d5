//! Alpha diversity of sample columns.
//!
//! Diversity is reported as the Hill number of order 1: two raised to the
//! base-2 Shannon entropy, i.e. the number of equally abundant annotations
//! that would produce the same entropy.

use crate::convert::slice_column;
use crate::data::{AnnotationKind, Applicability, DiversityResult};
use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::f64::consts::LN_2;

/// Shannon entropy of a column in bits.
///
/// Zero cells are skipped. The natural-log sum is converted to base 2 with a
/// single division at the end. An all-zero column has entropy 0.
pub fn shannon_entropy_bits(column: &[f64]) -> f64 {
    let total: f64 = column.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut h = 0.0;
    for &n in column {
        if n > 0.0 {
            let p = n / total;
            h += p * (1.0 / p).ln();
        }
    }
    h / LN_2
}

/// Hill number of order 1 for a column; 0 for an empty sample.
pub fn hill_number(column: &[f64]) -> f64 {
    let total: f64 = column.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    2f64.powf(shannon_entropy_bits(column))
}

/// Alpha diversity of every sample in a dense matrix.
///
/// Only defined for organism annotations; any other kind returns
/// [`Applicability::NotApplicable`] without touching the data.
pub fn alpha_diversity(
    dense: &DMatrix<f64>,
    sample_ids: &[String],
    annotation: AnnotationKind,
) -> Result<Applicability<DiversityResult>> {
    if !annotation.supports_diversity() {
        return Ok(Applicability::NotApplicable);
    }
    if sample_ids.len() != dense.ncols() {
        return Err(DivError::DimensionMismatch {
            expected: dense.ncols(),
            actual: sample_ids.len(),
        });
    }

    let values: Vec<(String, f64)> = sample_ids
        .par_iter()
        .enumerate()
        .map(|(j, id)| (id.clone(), hill_number(&slice_column(dense, j))))
        .collect();

    Ok(Applicability::Applicable(DiversityResult::new(values)))
}
