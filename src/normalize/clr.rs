//! Centered Log-Ratio (CLR) transformation for compositional data.

use super::Normalizer;
use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// CLR after adding a pseudocount to every cell.
///
/// # Formula
/// For sample j: CLR(x_ij) = log(x_ij + c) - mean_i(log(x_ij + c))
///
/// The subtracted mean is the log of the sample's geometric mean, so each
/// transformed column sums to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteredLogRatio {
    pub pseudocount: f64,
}

impl Default for CenteredLogRatio {
    fn default() -> Self {
        Self { pseudocount: 0.5 }
    }
}

impl Normalizer for CenteredLogRatio {
    fn name(&self) -> String {
        format!("CLR (pseudocount={})", self.pseudocount)
    }

    fn normalize(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if self.pseudocount <= 0.0 {
            return Err(DivError::InvalidParameter(
                "CLR pseudocount must be positive".to_string(),
            ));
        }
        let (n_rows, n_samples) = data.shape();

        if let Some((idx, val)) = data.iter().enumerate().find(|(_, v)| **v < 0.0) {
            return Err(DivError::Numerical(format!(
                "CLR requires non-negative abundances; found {} at ({}, {})",
                val,
                idx % n_rows,
                idx / n_rows
            )));
        }

        let log_data: DMatrix<f64> = data.map(|x| (x + self.pseudocount).ln());

        // mean of logs = log of the geometric mean
        let log_geom_means: Vec<f64> = (0..n_samples)
            .into_par_iter()
            .map(|j| log_data.column(j).sum() / n_rows as f64)
            .collect();

        Ok(DMatrix::from_fn(n_rows, n_samples, |i, j| {
            log_data[(i, j)] - log_geom_means[j]
        }))
    }
}
