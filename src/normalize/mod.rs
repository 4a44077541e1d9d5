//! Normalization of dense abundance matrices for ordination and heatmaps.
//!
//! The transform itself sits behind the [`Normalizer`] trait; this module
//! only guarantees the contract around it (empty input short-circuits, the
//! output keeps the input's shape and identifiers).
//!
//! - **LogStandardize**: log2, per-sample standardization, rescale to [0, 1]
//! - **TSS**: total sum scaling / relative abundance
//! - **CLR**: centered log-ratio after a pseudocount

pub mod clr;
pub mod log_standardize;
pub mod tss;

pub use clr::CenteredLogRatio;
pub use log_standardize::LogStandardize;
pub use tss::{scale, TotalSumScaling};

use crate::error::{DivError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A same-shape transform of a dense matrix (annotations × samples).
pub trait Normalizer: Send + Sync {
    /// Human readable name, recorded on the output.
    fn name(&self) -> String;

    /// Transform the matrix. Must return the same shape.
    fn normalize(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>>;
}

/// A normalized matrix with its identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMatrix {
    /// The normalized data (annotations × samples).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Annotation identifiers.
    pub row_ids: Vec<String>,
    /// Sample identifiers.
    pub sample_ids: Vec<String>,
    /// Name of the normalization applied.
    pub transformation: String,
}

impl NormalizedMatrix {
    /// Get the normalized value for an annotation and sample.
    pub fn get(&self, row: usize, sample: usize) -> f64 {
        self.data[(row, sample)]
    }

    /// Number of annotations.
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Get a column (sample) as a vector.
    pub fn col(&self, sample: usize) -> Vec<f64> {
        self.data.column(sample).iter().cloned().collect()
    }

    /// Get reference to the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// Which normalizer an analysis uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    #[default]
    LogStandardize,
    TotalSumScaling { scale_factor: f64 },
    CenteredLogRatio { pseudocount: f64 },
}

impl NormalizationMethod {
    /// Check parameters without running anything.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::LogStandardize => Ok(()),
            Self::TotalSumScaling { scale_factor } => {
                if scale_factor > 0.0 && scale_factor.is_finite() {
                    Ok(())
                } else {
                    Err(DivError::InvalidParameter(
                        "Scale factor must be positive".to_string(),
                    ))
                }
            }
            Self::CenteredLogRatio { pseudocount } => {
                if pseudocount > 0.0 && pseudocount.is_finite() {
                    Ok(())
                } else {
                    Err(DivError::InvalidParameter(
                        "CLR pseudocount must be positive".to_string(),
                    ))
                }
            }
        }
    }

    /// Instantiate the normalizer.
    pub fn normalizer(&self) -> Box<dyn Normalizer> {
        match *self {
            Self::LogStandardize => Box::new(LogStandardize),
            Self::TotalSumScaling { scale_factor } => Box::new(TotalSumScaling { scale_factor }),
            Self::CenteredLogRatio { pseudocount } => Box::new(CenteredLogRatio { pseudocount }),
        }
    }
}

/// Run a normalizer over a dense matrix.
///
/// Returns `Ok(None)` for a matrix with no annotations or no samples; the
/// normalizer is not invoked in that case.
pub fn normalize(
    dense: &DMatrix<f64>,
    row_ids: &[String],
    sample_ids: &[String],
    normalizer: &dyn Normalizer,
) -> Result<Option<NormalizedMatrix>> {
    let (n_rows, n_samples) = dense.shape();
    if n_rows == 0 || n_samples == 0 {
        return Ok(None);
    }
    if row_ids.len() != n_rows {
        return Err(DivError::DimensionMismatch {
            expected: n_rows,
            actual: row_ids.len(),
        });
    }
    if sample_ids.len() != n_samples {
        return Err(DivError::DimensionMismatch {
            expected: n_samples,
            actual: sample_ids.len(),
        });
    }

    let data = normalizer.normalize(dense)?;
    if data.shape() != dense.shape() {
        return Err(DivError::DimensionMismatch {
            expected: n_rows * n_samples,
            actual: data.nrows() * data.ncols(),
        });
    }

    Ok(Some(NormalizedMatrix {
        data,
        row_ids: row_ids.to_vec(),
        sample_ids: sample_ids.to_vec(),
        transformation: normalizer.name(),
    }))
}
