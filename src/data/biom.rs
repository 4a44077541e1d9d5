//! BIOM-style JSON documents, the exchange format abundance matrices arrive in.

use crate::data::abundance_matrix::{AbundanceMatrix, MatrixType, Triple};
use crate::data::annotation::AnnotationKind;
use crate::error::{DivError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Column metadata key holding a sample's true total observation count.
pub const SEQUENCE_COUNT_KEY: &str = "sequence_count_raw";

/// A row or column object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomEntry {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// A BIOM table as parsed from JSON, before validation.
///
/// `shape` and `matrix_type` are optional at the serde level so that their
/// absence is reported as a format error by [`BiomTable::into_matrix`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomTable {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, rename = "type")]
    pub table_type: Option<String>,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub matrix_element_type: Option<String>,
    #[serde(default)]
    pub matrix_type: Option<String>,
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    #[serde(default)]
    pub rows: Vec<BiomEntry>,
    #[serde(default)]
    pub columns: Vec<BiomEntry>,
    #[serde(default)]
    pub data: Value,
}

impl BiomTable {
    /// Parse a BIOM table from a JSON string.
    ///
    /// Unparseable JSON is a malformed matrix and reported as
    /// [`DivError::Format`], not [`DivError::Json`], which is kept for
    /// serializing results.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DivError::Format(e.to_string()))
    }

    /// Load a BIOM table from a local JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&text)?;
        log::info!(
            "loaded BIOM table {} from {}",
            table.id.as_deref().unwrap_or("<unnamed>"),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Annotation kind implied by the table `type`, if recognizable.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        self.table_type.as_deref().and_then(AnnotationKind::from_biom_type)
    }

    /// Per-sample totals read from column metadata.
    ///
    /// Accepts the count at the top level of the metadata object or nested
    /// under `stats`, as a number or a numeric string. Anything else yields
    /// `None` for that sample.
    pub fn sample_totals(&self) -> Vec<Option<u64>> {
        self.columns
            .iter()
            .map(|c| c.metadata.as_ref().and_then(sequence_count))
            .collect()
    }

    /// Validate the document and build an [`AbundanceMatrix`].
    pub fn into_matrix(self) -> Result<AbundanceMatrix> {
        let matrix_type: MatrixType = self
            .matrix_type
            .as_deref()
            .ok_or_else(|| DivError::Format("missing 'matrix_type'".to_string()))?
            .parse()?;
        let shape = self
            .shape
            .as_ref()
            .ok_or_else(|| DivError::Format("missing 'shape'".to_string()))?;
        if shape.len() != 2 {
            return Err(DivError::Format(format!(
                "'shape' must have two entries, got {}",
                shape.len()
            )));
        }
        let (n_rows, n_cols) = (shape[0], shape[1]);
        if self.rows.len() != n_rows {
            return Err(DivError::DimensionMismatch {
                expected: n_rows,
                actual: self.rows.len(),
            });
        }
        if self.columns.len() != n_cols {
            return Err(DivError::DimensionMismatch {
                expected: n_cols,
                actual: self.columns.len(),
            });
        }

        let totals = self.sample_totals();
        let row_ids: Vec<String> = self.rows.into_iter().map(|r| r.id).collect();
        let (column_ids, column_metadata): (Vec<String>, Vec<Option<Value>>) =
            self.columns.into_iter().map(|c| (c.id, c.metadata)).unzip();

        let matrix = match matrix_type {
            MatrixType::Sparse => {
                AbundanceMatrix::sparse(parse_sparse(&self.data)?, row_ids, column_ids)?
            }
            MatrixType::Dense => {
                AbundanceMatrix::dense_from_rows(parse_dense(&self.data)?, row_ids, column_ids)?
            }
        };
        log::debug!(
            "built {} abundance matrix {}x{}",
            matrix_type,
            n_rows,
            n_cols
        );
        matrix
            .with_sample_totals(totals)?
            .with_column_metadata(column_metadata)
    }
}

impl AbundanceMatrix {
    /// Build a matrix from a parsed BIOM table.
    pub fn from_biom(table: BiomTable) -> Result<Self> {
        table.into_matrix()
    }
}

fn sequence_count(metadata: &Value) -> Option<u64> {
    let raw = metadata
        .get(SEQUENCE_COUNT_KEY)
        .or_else(|| metadata.get("stats").and_then(|s| s.get(SEQUENCE_COUNT_KEY)))?;
    match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value, what: &str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| DivError::Format(format!("{} must be numeric, got {}", what, value)))
}

fn parse_index(value: &Value, what: &str) -> Result<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| DivError::Format(format!("{} must be a non-negative integer, got {}", what, value)))
}

fn parse_sparse(data: &Value) -> Result<Vec<Triple>> {
    let entries = data
        .as_array()
        .ok_or_else(|| DivError::Format("sparse 'data' must be an array of triples".to_string()))?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.as_array().map(Vec::as_slice) {
            Some([r, c, v]) => Ok(Triple::new(
                parse_index(r, "row index")?,
                parse_index(c, "column index")?,
                parse_number(v, "value")?,
            )),
            _ => Err(DivError::Format(format!(
                "sparse entry {} is not a [row, column, value] triple",
                i
            ))),
        })
        .collect()
}

fn parse_dense(data: &Value) -> Result<Vec<Vec<f64>>> {
    let rows = data
        .as_array()
        .ok_or_else(|| DivError::Format("dense 'data' must be an array of rows".to_string()))?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_array()
                .ok_or_else(|| DivError::Format(format!("dense row {} is not an array", i)))?
                .iter()
                .map(|v| parse_number(v, "value"))
                .collect()
        })
        .collect()
}
