// mod.rs - Dataset loaders

pub mod csv;
pub mod remote;

use crate::data::Dataset;
use std::path::PathBuf;

/// Where to read the dataset from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// Classify a user-supplied location: http(s) URLs are remote, anything else is a path
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            DataSource::File(PathBuf::from(path))
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Url(url) => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }

    /// Load and parse the dataset
    pub fn load(&self, delimiter: u8) -> Result<Dataset, String> {
        println!("📊 Loading dataset: {}", self.describe());
        let dataset = match self {
            DataSource::Url(url) => {
                let bytes = remote::fetch_bytes(url)?;
                Dataset::from_delimited_bytes(&bytes, delimiter, url)?
            }
            DataSource::File(path) => Dataset::from_delimited_file(path, delimiter)?,
        };
        println!(
            "✅ Dataset loaded: {} rows × {} columns (digest {})",
            dataset.n_rows(),
            dataset.n_columns(),
            dataset.digest
        );
        Ok(dataset)
    }
}
