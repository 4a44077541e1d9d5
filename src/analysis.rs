//! Per-matrix analysis with compute-once caches.
//!
//! An [`Analysis`] owns one immutable [`AbundanceMatrix`] and memoizes
//! everything derived from it: the dense view, alpha diversity, rarefaction
//! curves and the normalized matrix. Each derived value is computed at most
//! once even when several threads ask for it at the same time; afterwards
//! reads go straight to the cached value.

use crate::config::AnalysisConfig;
use crate::convert::{slice_column, to_dense};
use crate::data::{
    AbundanceMatrix, AnnotationKind, Applicability, DiversityResult, OrdinationInput,
    RarefactionCurve,
};
use crate::diversity::alpha_diversity;
use crate::error::Result;
use crate::normalize::{normalize, NormalizedMatrix};
use crate::rarefaction::rarefaction_curve;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

type CurveCell = Arc<OnceLock<RarefactionCurve>>;

/// Statistics over one abundance matrix.
#[derive(Debug)]
pub struct Analysis {
    matrix: AbundanceMatrix,
    config: AnalysisConfig,
    dense: OnceLock<DMatrix<f64>>,
    dense_init: Mutex<()>,
    diversity: OnceLock<DiversityResult>,
    diversity_init: Mutex<()>,
    normalized: OnceLock<Option<NormalizedMatrix>>,
    normalized_init: Mutex<()>,
    /// Keyed by (column index, total read count).
    curves: Mutex<HashMap<(usize, u64), CurveCell>>,
}

impl Analysis {
    /// Analyse a matrix with default settings for an annotation kind.
    pub fn new(matrix: AbundanceMatrix, annotation: AnnotationKind) -> Self {
        Self::build(matrix, AnalysisConfig::for_annotation(annotation))
    }

    /// Analyse a matrix with explicit settings.
    pub fn with_config(matrix: AbundanceMatrix, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(matrix, config))
    }

    fn build(matrix: AbundanceMatrix, config: AnalysisConfig) -> Self {
        Self {
            matrix,
            config,
            dense: OnceLock::new(),
            dense_init: Mutex::new(()),
            diversity: OnceLock::new(),
            diversity_init: Mutex::new(()),
            normalized: OnceLock::new(),
            normalized_init: Mutex::new(()),
            curves: Mutex::new(HashMap::new()),
        }
    }

    /// The source matrix.
    pub fn matrix(&self) -> &AbundanceMatrix {
        &self.matrix
    }

    /// Settings in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// What the matrix rows annotate.
    pub fn annotation(&self) -> AnnotationKind {
        self.config.annotation
    }

    /// Sample identifiers in column order.
    pub fn sample_ids(&self) -> &[String] {
        self.matrix.column_ids()
    }

    /// Annotation identifiers in row order.
    pub fn annotation_ids(&self) -> &[String] {
        self.matrix.row_ids()
    }

    /// Dense view of the matrix, materialized on first use.
    pub fn dense(&self) -> Result<&DMatrix<f64>> {
        get_or_try_init(&self.dense, &self.dense_init, || {
            log::debug!(
                "materializing dense {}x{} view",
                self.matrix.row_count(),
                self.matrix.column_count()
            );
            to_dense(&self.matrix)
        })
    }

    /// Abundances of one sample, in annotation order.
    pub fn sample_column(&self, sample_id: &str) -> Result<Vec<f64>> {
        let idx = self.matrix.column_index_of(sample_id)?;
        Ok(slice_column(self.dense()?, idx))
    }

    /// Alpha diversity of every sample.
    pub fn alpha_diversity(&self) -> Result<Applicability<&DiversityResult>> {
        if !self.annotation().supports_diversity() {
            return Ok(Applicability::NotApplicable);
        }
        let result = get_or_try_init(&self.diversity, &self.diversity_init, || {
            let dense = self.dense()?;
            log::debug!("computing alpha diversity for {} samples", dense.ncols());
            Ok(alpha_diversity(dense, self.sample_ids(), self.annotation())?
                .applicable()
                .unwrap_or_else(|| DiversityResult::new(Vec::new())))
        })?;
        Ok(Applicability::Applicable(result))
    }

    /// Rarefaction curve of one sample against its true total read count.
    pub fn rarefaction_curve(
        &self,
        sample_id: &str,
        total_read_count: u64,
    ) -> Result<Applicability<RarefactionCurve>> {
        if !self.annotation().supports_diversity() {
            return Ok(Applicability::NotApplicable);
        }
        let idx = self.matrix.column_index_of(sample_id)?;
        Ok(Applicability::Applicable(self.curve_at(idx, total_read_count)?))
    }

    /// Cached curve for the column at `idx`.
    fn curve_at(&self, idx: usize, total_read_count: u64) -> Result<RarefactionCurve> {
        let dense = self.dense()?;
        let sample_id = &self.sample_ids()[idx];

        let cell = {
            let mut curves = lock(&self.curves);
            Arc::clone(curves.entry((idx, total_read_count)).or_default())
        };
        let curve = cell.get_or_init(|| {
            log::debug!(
                "computing rarefaction curve for {} at total {}",
                sample_id,
                total_read_count
            );
            rarefaction_curve(
                sample_id,
                &slice_column(dense, idx),
                total_read_count,
                self.config.rarefaction_resolution,
            )
        });
        Ok(curve.clone())
    }

    /// Rarefaction curves of every sample, using the matrix's known totals.
    ///
    /// A sample without a known total gets an empty curve.
    pub fn rarefaction(&self) -> Result<Applicability<Vec<RarefactionCurve>>> {
        if !self.annotation().supports_diversity() {
            return Ok(Applicability::NotApplicable);
        }
        self.dense()?;

        let curves = self
            .sample_ids()
            .par_iter()
            .zip(self.matrix.sample_totals().par_iter())
            .enumerate()
            .map(|(idx, (id, total))| match total {
                Some(total) => self.curve_at(idx, *total),
                None => {
                    log::warn!("no total read count for sample {}, skipping rarefaction", id);
                    Ok(RarefactionCurve::empty(id))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Applicability::Applicable(curves))
    }

    /// Normalized matrix, or `None` when the matrix is empty.
    pub fn normalized(&self) -> Result<Option<&NormalizedMatrix>> {
        let normalized = get_or_try_init(&self.normalized, &self.normalized_init, || {
            let normalizer = self.config.normalization.normalizer();
            log::debug!("normalizing with {}", normalizer.name());
            normalize(
                self.dense()?,
                self.annotation_ids(),
                self.sample_ids(),
                normalizer.as_ref(),
            )
        })?;
        Ok(normalized.as_ref())
    }

    /// Input for an external ordination or heatmap tool.
    ///
    /// `normalized` selects the normalized matrix over the raw dense one.
    /// Returns `None` when the matrix has no annotations or no samples.
    pub fn ordination_input(&self, normalized: bool) -> Result<Option<OrdinationInput>> {
        if normalized {
            return Ok(self.normalized()?.map(|n| OrdinationInput {
                data: n.data.clone(),
                row_ids: n.row_ids.clone(),
                sample_ids: n.sample_ids.clone(),
                normalized: true,
                transformation: Some(n.transformation.clone()),
            }));
        }

        let dense = self.dense()?;
        if dense.nrows() == 0 || dense.ncols() == 0 {
            return Ok(None);
        }
        Ok(Some(OrdinationInput {
            data: dense.clone(),
            row_ids: self.annotation_ids().to_vec(),
            sample_ids: self.sample_ids().to_vec(),
            normalized: false,
            transformation: None,
        }))
    }
}

/// Fallible compute-once: concurrent callers wait on `init`, and a failed
/// computation leaves the cell empty so the error is reported again.
fn get_or_try_init<'a, T>(
    cell: &'a OnceLock<T>,
    init: &Mutex<()>,
    f: impl FnOnce() -> Result<T>,
) -> Result<&'a T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let _guard = lock(init);
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = f()?;
    Ok(cell.get_or_init(|| value))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
