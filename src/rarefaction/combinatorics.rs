//! Log-space binomial coefficients for the rarefaction estimator.
//!
//! These reproduce a fixed set of conventions rather than textbook values,
//! and downstream comparisons depend on them:
//!
//! - `ln_choose(n, r)` with `r > n` is `ln 1 = 0`, not `-inf`, so the
//!   absence term stays finite once an annotation's pool is exhausted.
//! - Below [`EXACT_LIMIT`] the coefficient comes from an iterative product
//!   over `x in 0..=r-2`.
//! - Above it, [`ln_gamma_stirling`] is used, which is a single-term
//!   Stirling form and tracks `ln Γ(x + 1)` rather than `ln Γ(x)`.

use std::f64::consts::PI;

/// Both arguments must be below this for the exact product branch.
pub const EXACT_LIMIT: u64 = 50;

/// Coarse Stirling approximation used in place of log-gamma.
///
/// `ln(2π)/2 + x·ln x + ln(x)/2 − x` for `x > 0`, otherwise 0. Intentionally
/// not the exact function.
pub fn ln_gamma_stirling(x: f64) -> f64 {
    if x > 0.0 {
        let s = x.ln();
        (2.0 * PI).ln() / 2.0 + x * s + s / 2.0 - x
    } else {
        0.0
    }
}

/// Natural log of "n choose r" under the estimator's conventions.
///
/// `n` is an abundance and need not be integral: matrices that were already
/// sub-sampled or scaled carry fractional cells. `r` is a draw size.
pub fn ln_choose(n: f64, r: u64) -> f64 {
    let rf = r as f64;
    if rf > n {
        return 0.0;
    }
    if n < EXACT_LIMIT as f64 && r < EXACT_LIMIT {
        let mut c = 1.0_f64;
        for x in 0..r.saturating_sub(1) {
            let x = x as f64;
            c *= (n - x) / (x + 1.0);
        }
        return c.ln();
    }
    ln_gamma_stirling(n + 1.0) - ln_gamma_stirling(rf + 1.0) - ln_gamma_stirling(n - rf)
}
