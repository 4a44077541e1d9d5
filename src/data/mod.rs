//! Data structures for abundance matrix analysis.

mod abundance_matrix;
mod annotation;
mod biom;
mod ordination;
mod result;

pub use abundance_matrix::{AbundanceMatrix, MatrixData, MatrixType, Triple};
pub use annotation::AnnotationKind;
pub use biom::{BiomEntry, BiomTable, SEQUENCE_COUNT_KEY};
pub use ordination::OrdinationInput;
pub use result::{Applicability, DiversityResult, RarefactionCurve, RarefactionPoint};
