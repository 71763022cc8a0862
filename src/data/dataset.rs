// dataset.rs - Tabular dataset and feature matrix

use ndarray::{Array1, Array2, Axis};

/// Numeric table loaded from a delimited file
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    /// Where the data came from (URL or path)
    pub source: String,
    /// Short SHA-256 digest of the raw bytes
    pub digest: String,
}

/// Feature records (samples × features) with their column names, target column removed
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub records: Array2<f64>,
}

impl Dataset {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy of the dataset restricted to the given rows, in the given order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            source: self.source.clone(),
            digest: self.digest.clone(),
        }
    }

    /// Separate the target column from the features
    pub fn split_target(&self, target: &str) -> Result<(FeatureMatrix, Array1<f64>), String> {
        let target_idx = self.column_index(target).ok_or_else(|| {
            format!(
                "Target column '{}' not found. Available columns: {}",
                target,
                self.columns.join(", ")
            )
        })?;

        if self.columns.len() < 2 {
            return Err("Dataset needs at least one feature column besides the target".to_string());
        }

        let table = table_to_array(&self.rows, self.columns.len())?;
        let feature_idx: Vec<usize> = (0..self.columns.len()).filter(|i| *i != target_idx).collect();
        let names = feature_idx.iter().map(|&i| self.columns[i].clone()).collect();

        let records = table.select(Axis(1), &feature_idx);
        let targets = table.column(target_idx).to_owned();
        Ok((FeatureMatrix { names, records }, targets))
    }
}

/// Row-major table into a samples × columns array
fn table_to_array(rows: &[Vec<f64>], width: usize) -> Result<Array2<f64>, String> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(format!("Row {} has {} values, expected {}", i, row.len(), width));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), width), flat).map_err(|e| format!("Failed to build feature matrix: {}", e))
}

impl FeatureMatrix {
    /// Build from named columns and row-major values
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, String> {
        let records = table_to_array(rows, names.len())?;
        Ok(Self { names, records })
    }

    pub fn n_rows(&self) -> usize {
        self.records.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.records.ncols()
    }
}
