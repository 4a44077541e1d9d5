//! Annotation kinds a matrix's rows can carry.

use crate::error::{DivError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the rows of an abundance matrix annotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Taxonomic labels. The only kind diversity and rarefaction apply to.
    #[default]
    Organism,
    /// Functional roles (e.g. subsystems).
    Function,
    /// Ontology terms (COG, KO, NOG, ...).
    Ontology,
    /// Gene or protein features.
    Feature,
}

impl AnnotationKind {
    /// Whether ecological diversity statistics are defined for this kind.
    pub fn supports_diversity(&self) -> bool {
        matches!(self, Self::Organism)
    }

    /// Lowercase name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Organism => "organism",
            Self::Function => "function",
            Self::Ontology => "ontology",
            Self::Feature => "feature",
        }
    }

    /// Guess the annotation kind from a BIOM `type` field.
    ///
    /// Returns `None` for table types that do not name a kind.
    pub fn from_biom_type(table_type: &str) -> Option<Self> {
        let t = table_type.to_ascii_lowercase();
        if t.starts_with("taxon") || t.starts_with("otu") {
            Some(Self::Organism)
        } else if t.starts_with("function") || t.starts_with("pathway") {
            Some(Self::Function)
        } else if t.starts_with("ortholog") {
            Some(Self::Ontology)
        } else if t.starts_with("gene") {
            Some(Self::Feature)
        } else {
            None
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnnotationKind {
    type Err = DivError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organism" => Ok(Self::Organism),
            "function" => Ok(Self::Function),
            "ontology" => Ok(Self::Ontology),
            "feature" => Ok(Self::Feature),
            other => Err(DivError::InvalidParameter(format!(
                "Unknown annotation kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("organism".parse::<AnnotationKind>().unwrap(), AnnotationKind::Organism);
        assert_eq!(" Function ".parse::<AnnotationKind>().unwrap(), AnnotationKind::Function);
        assert!("pathway".parse::<AnnotationKind>().is_err());
    }

    #[test]
    fn test_only_organism_supports_diversity() {
        assert!(AnnotationKind::Organism.supports_diversity());
        assert!(!AnnotationKind::Function.supports_diversity());
        assert!(!AnnotationKind::Ontology.supports_diversity());
        assert!(!AnnotationKind::Feature.supports_diversity());
    }

    #[test]
    fn test_from_biom_type() {
        assert_eq!(AnnotationKind::from_biom_type("Taxon table"), Some(AnnotationKind::Organism));
        assert_eq!(AnnotationKind::from_biom_type("OTU table"), Some(AnnotationKind::Organism));
        assert_eq!(AnnotationKind::from_biom_type("Function table"), Some(AnnotationKind::Function));
        assert_eq!(AnnotationKind::from_biom_type("Metabolite table"), None);
    }
}
