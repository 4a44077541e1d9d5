//! Total Sum Scaling (TSS) normalization.
//!
//! TSS converts abundances to relative abundances by dividing each value by
//! the total of its sample, optionally multiplied by a scale factor (1e6 for
//! counts per million).

use super::Normalizer;
use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Divide every value by its sample total, times `scale_factor`.
///
/// # Formula
/// For sample j: TSS(x_ij) = x_ij / sum(x_j) * scale_factor
///
/// Samples with a zero total stay all zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalSumScaling {
    pub scale_factor: f64,
}

impl Default for TotalSumScaling {
    fn default() -> Self {
        Self {
            scale_factor: scale::PROPORTION,
        }
    }
}

impl Normalizer for TotalSumScaling {
    fn name(&self) -> String {
        format!("TSS (scale={})", self.scale_factor)
    }

    fn normalize(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if self.scale_factor <= 0.0 {
            return Err(DivError::InvalidParameter(
                "Scale factor must be positive".to_string(),
            ));
        }
        let (n_rows, n_samples) = data.shape();

        let normalized_cols: Vec<Vec<f64>> = (0..n_samples)
            .into_par_iter()
            .map(|j| {
                let lib_size: f64 = data.column(j).sum();
                if lib_size <= 0.0 {
                    return vec![0.0; n_rows];
                }
                data.column(j)
                    .iter()
                    .map(|&v| (v / lib_size) * self.scale_factor)
                    .collect()
            })
            .collect();

        Ok(DMatrix::from_fn(n_rows, n_samples, |i, j| normalized_cols[j][i]))
    }
}

/// Common scale factors for TSS normalization.
pub mod scale {
    /// Proportions (sum to 1.0 per sample).
    pub const PROPORTION: f64 = 1.0;
    /// Counts per million (CPM).
    pub const CPM: f64 = 1_000_000.0;
    /// Counts per 100 (percentages).
    pub const PERCENT: f64 = 100.0;
}
