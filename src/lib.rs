//! Composable Diversity: abundance matrix statistics for metagenomics
//!
//! This library loads BIOM-style abundance matrices (annotations × samples)
//! and computes per-sample statistics on them.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (AbundanceMatrix, BiomTable, results)
//! - **convert**: Sparse to dense conversion
//! - **diversity**: Alpha diversity (Hill number of order 1)
//! - **rarefaction**: Closed-form rarefaction curves
//! - **normalize**: Normalization for ordination and heatmaps
//! - **config**: YAML analysis settings
//! - **analysis**: Per-matrix facade with compute-once caches
//!
//! # Example
//!
//! ```no_run
//! use composable_diversity::prelude::*;
//!
//! let table = BiomTable::from_json_file("gut.biom").unwrap();
//! let annotation = table.annotation_kind().unwrap_or_default();
//! let analysis = Analysis::new(AbundanceMatrix::from_biom(table).unwrap(), annotation);
//!
//! if let Applicability::Applicable(div) = analysis.alpha_diversity().unwrap() {
//!     for (sample, value) in div.iter() {
//!         println!("{}\t{:.3}", sample, value);
//!     }
//! }
//! let heatmap = analysis.ordination_input(true).unwrap();
//! ```

pub mod analysis;
pub mod config;
pub mod convert;
pub mod data;
pub mod diversity;
pub mod error;
pub mod normalize;
pub mod rarefaction;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::Analysis;
    pub use crate::config::AnalysisConfig;
    pub use crate::convert::{slice_column, to_dense};
    pub use crate::data::{
        AbundanceMatrix, AnnotationKind, Applicability, BiomEntry, BiomTable, DiversityResult,
        MatrixData, MatrixType, OrdinationInput, RarefactionCurve, RarefactionPoint, Triple,
    };
    pub use crate::diversity::{alpha_diversity, hill_number, shannon_entropy_bits};
    pub use crate::error::{DivError, Result};
    pub use crate::normalize::{
        normalize, scale as tss_scale, CenteredLogRatio, LogStandardize, NormalizationMethod,
        NormalizedMatrix, Normalizer, TotalSumScaling,
    };
    pub use crate::rarefaction::{
        ln_choose, ln_gamma_stirling, rarefaction_curve, rarefaction_step, DEFAULT_RESOLUTION,
    };
}
