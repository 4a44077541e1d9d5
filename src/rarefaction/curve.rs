//! Closed-form rarefaction curve of one sample column.

use super::combinatorics::ln_choose;
use crate::data::{RarefactionCurve, RarefactionPoint};

/// Default number of depth intervals a curve is split into.
pub const DEFAULT_RESOLUTION: u64 = 1000;

/// Depth increment for a sample: `max(1, total / resolution)`.
pub fn rarefaction_step(total_read_count: u64, resolution: u64) -> u64 {
    (total_read_count / resolution.max(1)).max(1)
}

/// Expected number of annotations seen in a sub-sample of `depth` reads.
///
/// `abundances` must already be sorted; richness is measured against the
/// full length of the column, zero entries included.
fn expected_richness(abundances: &[f64], total: f64, depth: u64) -> f64 {
    let coeff = ln_choose(total, depth);
    let absent: f64 = abundances
        .iter()
        .map(|&n| (ln_choose(total - n, depth) - coeff).exp())
        .sum();
    abundances.len() as f64 - absent
}

/// Rarefaction curve for one sample column.
///
/// `total_read_count` is the sample's true sequencing depth, which the
/// matrix itself cannot provide once it has been sub-sampled. Depths run
/// from 0 to `total_read_count` inclusive in steps of
/// [`rarefaction_step`]. Cell values are used as they are, fractional
/// abundances included.
pub fn rarefaction_curve(
    sample_id: &str,
    column: &[f64],
    total_read_count: u64,
    resolution: u64,
) -> RarefactionCurve {
    let mut abundances = column.to_vec();
    abundances.sort_unstable_by(f64::total_cmp);

    let step = rarefaction_step(total_read_count, resolution);
    let total = total_read_count as f64;
    let points = (0..=total_read_count)
        .step_by(step as usize)
        .map(|depth| RarefactionPoint {
            depth,
            expected_richness: expected_richness(&abundances, total, depth),
        })
        .collect();

    RarefactionCurve {
        sample_id: sample_id.to_string(),
        total_read_count,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rarefaction::ln_gamma_stirling;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_size() {
        assert_eq!(rarefaction_step(0, DEFAULT_RESOLUTION), 1);
        assert_eq!(rarefaction_step(999, DEFAULT_RESOLUTION), 1);
        assert_eq!(rarefaction_step(1000, DEFAULT_RESOLUTION), 1);
        assert_eq!(rarefaction_step(5000, DEFAULT_RESOLUTION), 5);
        assert_eq!(rarefaction_step(2_500_000, DEFAULT_RESOLUTION), 2500);
        assert_eq!(rarefaction_step(100, 0), 100);
    }

    #[test]
    fn test_point_count_is_bounded() {
        let curve = rarefaction_curve("s1", &[4_000_000.0, 1_000_000.0], 5_000_000, DEFAULT_RESOLUTION);
        assert_eq!(curve.len(), 1001);
        assert_eq!(curve.points[1].depth, 5000);
        assert_eq!(curve.points.last().unwrap().depth, 5_000_000);

        let small = rarefaction_curve("s2", &[3.0, 2.0], 5, DEFAULT_RESOLUTION);
        assert_eq!(small.depths(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_depth_zero_is_zero() {
        for column in [vec![10.0, 0.0], vec![3.0, 3.0, 3.0], vec![1.0, 0.0, 0.0, 40.0]] {
            let total = column.iter().sum::<f64>() as u64;
            let curve = rarefaction_curve("s", &column, total, DEFAULT_RESOLUTION);
            assert_eq!(curve.points[0].depth, 0);
            assert_eq!(curve.points[0].expected_richness, 0.0);
        }
    }

    #[test]
    fn test_single_annotation_full_depth() {
        // absent terms: zero row exp(0) = 1, full row exp(-ln 10) = 0.1
        let curve = rarefaction_curve("s1", &[10.0, 0.0], 10, DEFAULT_RESOLUTION);
        assert_relative_eq!(curve.at(10).unwrap(), 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_full_depth_near_richness_small_sample() {
        let curve = rarefaction_curve("s1", &[6.0, 4.0], 10, DEFAULT_RESOLUTION);
        assert_relative_eq!(curve.final_richness().unwrap(), 1.8, epsilon = 1e-9);
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let a = rarefaction_curve("a", &[120.0, 30.0, 0.0, 45.0], 195, DEFAULT_RESOLUTION);
        let b = rarefaction_curve("b", &[45.0, 0.0, 120.0, 30.0], 195, DEFAULT_RESOLUTION);
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn test_fractional_abundances_are_kept() {
        let a = rarefaction_curve("a", &[2.4, 7.6], 10, DEFAULT_RESOLUTION);
        let b = rarefaction_curve("b", &[2.0, 8.0], 10, DEFAULT_RESOLUTION);
        assert_ne!(a.points, b.points);

        // at depth 5: absent terms are C(10 - 2.4, 5) / C(10, 5) and 1 / C(10, 5)
        let coeff = ln_choose(10.0, 5);
        let expected = 2.0 - (ln_choose(10.0 - 2.4, 5) - coeff).exp() - (-coeff).exp();
        assert_relative_eq!(a.at(5).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_small_fractional_cells_are_not_erased() {
        let curve = rarefaction_curve("s", &[0.4, 0.4, 0.4], 1000, DEFAULT_RESOLUTION);
        let mid = curve.at(500).unwrap();
        assert!(mid > 0.5 && mid < 1.0, "mid-depth richness {}", mid);
    }

    #[test]
    fn test_depth_zero_above_exact_branch() {
        // Stirling terms do not cancel at depth 0 once the total reaches 50:
        // 2 - exp(-lnC(100, 0)) - exp(lnC(60, 0) - lnC(100, 0)), lnC(40, 0) = 0
        let curve = rarefaction_curve("s", &[60.0, 40.0], 100, DEFAULT_RESOLUTION);
        let coeff = ln_gamma_stirling(101.0) - ln_gamma_stirling(1.0) - ln_gamma_stirling(100.0);
        let sixty = ln_gamma_stirling(61.0) - ln_gamma_stirling(1.0) - ln_gamma_stirling(60.0);
        let expected = 2.0 - (-coeff).exp() - (sixty - coeff).exp();
        assert_relative_eq!(curve.at(0).unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(curve.at(0).unwrap(), 1.386_900_841_954_098, epsilon = 1e-9);
        assert!(curve.at(0).unwrap() > 0.0);
    }

    #[test]
    fn test_large_sample_mid_curve_is_finite() {
        let column = [600_000.0, 300_000.0, 90_000.0, 9_000.0, 1_000.0];
        let curve = rarefaction_curve("deep", &column, 1_000_000, DEFAULT_RESOLUTION);
        assert_eq!(curve.len(), 1001);
        assert!(curve.points.iter().all(|p| p.expected_richness.is_finite()));
        let mid = curve.at(500_000).unwrap();
        assert!(mid > 4.0 && mid <= 5.0 + 1e-9, "mid-depth richness {}", mid);
    }

    #[test]
    fn test_resolution_changes_step() {
        let curve = rarefaction_curve("s", &[50.0, 50.0], 100, 10);
        assert_eq!(curve.depths(), (0..=100).step_by(10).collect::<Vec<u64>>());
    }
}
