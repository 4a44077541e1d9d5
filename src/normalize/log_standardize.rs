//! Log-transform, standardize and rescale: the default normalization for
//! ordination and heatmap input.

use super::Normalizer;
use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// `log2(x + 1)`, then per-sample z-scores, then a global rescale to `[0, 1]`.
///
/// Samples with zero (or undefined) standard deviation are only centred. A
/// matrix whose values are all equal after standardization maps to zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStandardize;

impl Normalizer for LogStandardize {
    fn name(&self) -> String {
        "log2 standardized".to_string()
    }

    fn normalize(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let (n_rows, n_samples) = data.shape();
        if data.iter().any(|&v| v < 0.0) {
            return Err(DivError::Numerical(
                "log normalization requires non-negative abundances".to_string(),
            ));
        }

        let logged = data.map(|x| (x + 1.0).log2());

        let standardized: Vec<Vec<f64>> = (0..n_samples)
            .into_par_iter()
            .map(|j| {
                let col: Vec<f64> = logged.column(j).iter().copied().collect();
                let (mean, sd) = mean_and_sd(&col);
                let scale = if sd.is_finite() && sd > 0.0 { sd } else { 1.0 };
                col.iter().map(|&v| (v - mean) / scale).collect()
            })
            .collect();

        let mut out = DMatrix::from_fn(n_rows, n_samples, |i, j| standardized[j][i]);
        let (min, max) = value_range(&out);
        let range = max - min;
        if range > 0.0 {
            out.apply(|v| *v = (*v - min) / range);
        } else {
            out.fill(0.0);
        }
        Ok(out)
    }
}

fn value_range(data: &DMatrix<f64>) -> (f64, f64) {
    data.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Mean and sample standard deviation; the latter is NaN below two values.
fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    (values.mean(), values.std_dev())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_data() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 3, &[
            120.0,   3.0, 0.0,
             30.0, 800.0, 15.0,
              0.0,  25.0, 15.0,
             45.0,   1.0, 2.0,
        ])
    }

    #[test]
    fn test_range_is_unit_interval() {
        let out = LogStandardize.normalize(&create_test_data()).unwrap();
        assert_eq!(out.shape(), (4, 3));
        let (min, max) = value_range(&out);
        assert_relative_eq!(min, 0.0, epsilon = 1e-12);
        assert_relative_eq!(max, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_preserves_order_within_sample() {
        let data = create_test_data();
        let out = LogStandardize.normalize(&data).unwrap();
        for j in 0..data.ncols() {
            for a in 0..data.nrows() {
                for b in 0..data.nrows() {
                    if data[(a, j)] < data[(b, j)] {
                        assert!(out[(a, j)] < out[(b, j)]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_depth_invariance_of_shape() {
        // a sample that is a scaled copy of another lands close after log standardization
        let data = DMatrix::from_row_slice(3, 2, &[
            1000.0, 10000.0,
             100.0,  1000.0,
              10.0,   100.0,
        ]);
        let out = LogStandardize.normalize(&data).unwrap();
        for i in 0..3 {
            assert!((out[(i, 0)] - out[(i, 1)]).abs() < 0.05);
        }
    }

    #[test]
    fn test_constant_matrix_maps_to_zero() {
        let out = LogStandardize.normalize(&DMatrix::from_element(3, 2, 7.0)).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_row_is_centred_only() {
        let out = LogStandardize.normalize(&DMatrix::from_row_slice(1, 3, &[1.0, 3.0, 7.0])).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rejects_negative() {
        let data = DMatrix::from_row_slice(1, 2, &[1.0, -2.0]);
        assert!(LogStandardize.normalize(&data).is_err());
    }
}
