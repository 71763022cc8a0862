// csv.rs - Delimited text loader for numeric datasets

use crate::data::Dataset;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parse a single numeric cell
fn parse_cell(raw: &str) -> Result<f64, String> {
    let cleaned = raw.trim().trim_matches('"');
    if cleaned.is_empty() {
        return Err("empty value".to_string());
    }
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", cleaned))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", cleaned));
    }
    Ok(value)
}

/// First 8 hex chars of the SHA-256 of the raw bytes
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let full = format!("{:x}", hasher.finalize());
    full[..8].to_string()
}

impl Dataset {
    /// Parse delimited bytes with a header row into a numeric dataset
    pub fn from_delimited_bytes(bytes: &[u8], delimiter: u8, source: &str) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| format!("Failed to read header of '{}': {}", source, e))?
            .iter()
            .map(|h| h.trim_matches('"').to_string())
            .collect();

        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(format!("Dataset '{}' has an empty header", source));
        }

        let mut rows = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            // header is line 1
            let line = row_num + 2;
            let record = record.map_err(|e| format!("Failed to read line {} of '{}': {}", line, source, e))?;

            if record.len() != columns.len() {
                return Err(format!(
                    "Line {} has {} fields, expected {}",
                    line,
                    record.len(),
                    columns.len()
                ));
            }

            let mut values = Vec::with_capacity(columns.len());
            for (i, cell) in record.iter().enumerate() {
                let value = parse_cell(cell).map_err(|e| {
                    format!("Invalid value at line {} column '{}': {}", line, columns[i], e)
                })?;
                values.push(value);
            }
            rows.push(values);
        }

        if rows.is_empty() {
            return Err(format!("Dataset '{}' contains no data rows", source));
        }

        Ok(Self {
            columns,
            rows,
            source: source.to_string(),
            digest: content_digest(bytes),
        })
    }

    /// Load a delimited file from disk
    pub fn from_delimited_file(file_path: &Path, delimiter: u8) -> Result<Self, String> {
        let bytes = std::fs::read(file_path)
            .map_err(|e| format!("Failed to read dataset file '{}': {}", file_path.display(), e))?;
        Self::from_delimited_bytes(&bytes, delimiter, &file_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WINE_HEAD: &str = "\"fixed acidity\";\"volatile acidity\";\"quality\"\n\
                             7.4;0.7;5\n\
                             7.8;0.88;5\n\
                             11.2;0.28;6\n";

    #[test]
    fn test_parse_semicolon_with_quoted_header() {
        let ds = Dataset::from_delimited_bytes(WINE_HEAD.as_bytes(), b';', "wine").unwrap();
        assert_eq!(ds.columns, vec!["fixed acidity", "volatile acidity", "quality"]);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.rows[2], vec![11.2, 0.28, 6.0]);
        assert_eq!(ds.digest.len(), 8);
        assert_eq!(ds.source, "wine");
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Dataset::from_delimited_bytes(WINE_HEAD.as_bytes(), b';', "a").unwrap();
        let b = Dataset::from_delimited_bytes(WINE_HEAD.as_bytes(), b';', "b").unwrap();
        assert_eq!(a.digest, b.digest);
        assert_ne!(a.digest, content_digest(b"something else"));
    }

    #[test]
    fn test_non_numeric_cell_reports_line_and_column() {
        let data = "x;y\n1;2\n3;abc\n";
        let err = Dataset::from_delimited_bytes(data.as_bytes(), b';', "bad").unwrap_err();
        assert!(err.contains("line 3"), "{}", err);
        assert!(err.contains("'y'"), "{}", err);
    }

    #[test]
    fn test_non_finite_cells_are_rejected() {
        for bad in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let data = format!("x;y\n1;2\n{};4\n", bad);
            let err = Dataset::from_delimited_bytes(data.as_bytes(), b';', "bad").unwrap_err();
            assert!(err.contains("line 3"), "{}", err);
            assert!(err.contains("'x'"), "{}", err);
            assert!(err.contains("not a finite number"), "{}", err);
        }
    }

    #[test]
    fn test_ragged_and_empty_inputs_fail() {
        assert!(Dataset::from_delimited_bytes(b"x;y\n1;2;3\n", b';', "ragged").is_err());
        assert!(Dataset::from_delimited_bytes(b"x;y\n", b';', "empty").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1.5,2\n").unwrap();
        let ds = Dataset::from_delimited_file(file.path(), b',').unwrap();
        assert_eq!(ds.rows, vec![vec![1.5, 2.0]]);
    }
}
