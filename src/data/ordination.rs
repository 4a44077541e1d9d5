//! Matrix handed to external ordination and heatmap tools.

use crate::error::Result;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A dense matrix plus identifiers, raw or normalized.
///
/// This is the whole contract with the external multivariate solvers: they
/// receive values and labels, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinationInput {
    /// Values (annotations × samples).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Annotation identifiers.
    pub row_ids: Vec<String>,
    /// Sample identifiers, used as plot labels downstream.
    pub sample_ids: Vec<String>,
    /// Whether `data` went through the normalization stage.
    pub normalized: bool,
    /// Name of the normalization applied, if any.
    pub transformation: Option<String>,
}

impl OrdinationInput {
    /// Value for an annotation and sample.
    pub fn get(&self, row: usize, sample: usize) -> f64 {
        self.data[(row, sample)]
    }

    /// Number of annotations.
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Write as TSV: header of sample ids, then one line per annotation.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;

        let mut header = Vec::with_capacity(self.sample_ids.len() + 1);
        header.push("annotation".to_string());
        header.extend(self.sample_ids.iter().cloned());
        writer.write_record(&header)?;

        for (i, row_id) in self.row_ids.iter().enumerate() {
            let mut record = Vec::with_capacity(self.n_samples() + 1);
            record.push(row_id.clone());
            record.extend((0..self.n_samples()).map(|j| self.get(i, j).to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_to_tsv() {
        let input = OrdinationInput {
            data: DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.0, 2.0]),
            row_ids: vec!["taxA".into(), "taxB".into()],
            sample_ids: vec!["s1".into(), "s2".into()],
            normalized: false,
            transformation: None,
        };
        let file = NamedTempFile::new().unwrap();
        input.to_tsv(file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "annotation\ts1\ts2");
        assert_eq!(lines[1], "taxA\t1\t0.5");
        assert_eq!(lines[2], "taxB\t0\t2");
    }
}
