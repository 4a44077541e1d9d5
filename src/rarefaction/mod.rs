//! Rarefaction: expected annotation richness under sub-sampling.
//!
//! Uses the closed-form hypergeometric (Hurlbert/Heck) expectation instead
//! of repeated random sub-sampling. For a sample of `N` reads and an
//! annotation holding `n` of them, the chance that a draw of `i` reads
//! misses it entirely is `C(N − n, i) / C(N, i)`; summing that over the
//! column gives the expected number of annotations absent at depth `i`.
//! Everything is evaluated in log space so samples with millions of reads
//! stay finite.

pub mod combinatorics;
pub mod curve;

pub use combinatorics::{ln_choose, ln_gamma_stirling};
pub use curve::{rarefaction_curve, rarefaction_step, DEFAULT_RESOLUTION};
