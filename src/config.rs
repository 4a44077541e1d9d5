//! Analysis configuration, serialized as YAML.

use crate::data::AnnotationKind;
use crate::error::{DivError, Result};
use crate::normalize::NormalizationMethod;
use crate::rarefaction::DEFAULT_RESOLUTION;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every statistic computed for one matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    #[serde(default = "default_name")]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// What the matrix rows annotate.
    #[serde(default)]
    pub annotation: AnnotationKind,
    /// Normalization used for ordination and heatmap input.
    #[serde(default)]
    pub normalization: NormalizationMethod,
    /// Number of depth intervals per rarefaction curve.
    #[serde(default = "default_resolution")]
    pub rarefaction_resolution: u64,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_resolution() -> u64 {
    DEFAULT_RESOLUTION
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            annotation: AnnotationKind::default(),
            normalization: NormalizationMethod::default(),
            rarefaction_resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl AnalysisConfig {
    /// Default settings for an annotation kind.
    pub fn for_annotation(annotation: AnnotationKind) -> Self {
        Self {
            annotation,
            ..Self::default()
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(DivError::from)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.rarefaction_resolution == 0 {
            return Err(DivError::InvalidParameter(
                "rarefaction_resolution must be at least 1".to_string(),
            ));
        }
        self.normalization.validate()
    }
}
