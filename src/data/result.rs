//! Result types for diversity and rarefaction analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of an analysis that only makes sense for some annotation kinds.
///
/// Diversity and rarefaction are defined for taxonomic (organism) matrices
/// only. Asking for them on a functional matrix is a domain rule, not a
/// malformed input, so it is reported here instead of through
/// [`crate::error::DivError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability<T> {
    /// The statistic was computed.
    Applicable(T),
    /// The statistic is undefined for this annotation kind.
    NotApplicable,
}

impl<T> Applicability<T> {
    /// Whether a value was computed.
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Applicable(_))
    }

    /// Borrow the computed value, if any.
    pub fn as_ref(&self) -> Applicability<&T> {
        match self {
            Self::Applicable(v) => Applicability::Applicable(v),
            Self::NotApplicable => Applicability::NotApplicable,
        }
    }

    /// Transform the computed value, keeping `NotApplicable` as is.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Applicability<U> {
        match self {
            Self::Applicable(v) => Applicability::Applicable(f(v)),
            Self::NotApplicable => Applicability::NotApplicable,
        }
    }

    /// Convert into an `Option`, dropping the distinction.
    pub fn applicable(self) -> Option<T> {
        match self {
            Self::Applicable(v) => Some(v),
            Self::NotApplicable => None,
        }
    }
}

/// Alpha diversity (Hill number of order 1) per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityResult {
    /// `(sample_id, diversity)` pairs in matrix column order.
    values: Vec<(String, f64)>,
}

impl DiversityResult {
    pub(crate) fn new(values: Vec<(String, f64)>) -> Self {
        Self { values }
    }

    /// Diversity of one sample.
    pub fn get(&self, sample_id: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(id, _)| id == sample_id)
            .map(|(_, v)| *v)
    }

    /// Iterate over `(sample_id, diversity)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(id, v)| (id.as_str(), *v))
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the matrix had no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample id to diversity map, for serialization to external consumers.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.values.iter().cloned().collect()
    }
}

/// One point on a rarefaction curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarefactionPoint {
    /// Sub-sample size (reads drawn).
    pub depth: u64,
    /// Expected number of annotations observed at that depth.
    pub expected_richness: f64,
}

/// Expected annotation richness as a function of sub-sampled read depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarefactionCurve {
    /// Sample the curve belongs to.
    pub sample_id: String,
    /// True total observation count the curve was computed against.
    pub total_read_count: u64,
    /// Points in increasing depth order.
    pub points: Vec<RarefactionPoint>,
}

impl RarefactionCurve {
    /// A curve with no points, used when the sample's total is unknown.
    pub fn empty(sample_id: &str) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            total_read_count: 0,
            points: Vec::new(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points were computed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Expected richness at an exact sampled depth.
    pub fn at(&self, depth: u64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.depth == depth)
            .map(|p| p.expected_richness)
    }

    /// Depths in order.
    pub fn depths(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.depth).collect()
    }

    /// Expected richness at the deepest sampled depth.
    pub fn final_richness(&self) -> Option<f64> {
        self.points.last().map(|p| p.expected_richness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applicability_map_and_option() {
        let a: Applicability<u32> = Applicability::Applicable(2);
        assert!(a.is_applicable());
        assert_eq!(a.clone().map(|v| v * 2), Applicability::Applicable(4));
        assert_eq!(a.applicable(), Some(2));

        let n: Applicability<u32> = Applicability::NotApplicable;
        assert!(!n.is_applicable());
        assert_eq!(n.applicable(), None);
    }

    #[test]
    fn test_diversity_lookup() {
        let div = DiversityResult::new(vec![("s1".into(), 1.0), ("s2".into(), 2.5)]);
        assert_eq!(div.len(), 2);
        assert_eq!(div.get("s2"), Some(2.5));
        assert_eq!(div.get("missing"), None);
        let ids: Vec<&str> = div.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!(div.to_map().len(), 2);
    }

    #[test]
    fn test_curve_accessors() {
        let curve = RarefactionCurve {
            sample_id: "s1".into(),
            total_read_count: 4,
            points: vec![
                RarefactionPoint { depth: 0, expected_richness: 0.0 },
                RarefactionPoint { depth: 2, expected_richness: 1.5 },
                RarefactionPoint { depth: 4, expected_richness: 2.0 },
            ],
        };
        assert_eq!(curve.depths(), vec![0, 2, 4]);
        assert_eq!(curve.at(2), Some(1.5));
        assert_eq!(curve.at(3), None);
        assert_eq!(curve.final_richness(), Some(2.0));
        assert!(RarefactionCurve::empty("s2").is_empty());
    }
}
