// mod.rs - Output writers: run reports and model packages

pub mod model;

use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub use model::{load_model_dir, package_model, ModelPackage};

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportFormat {
    Json,
    Tsv,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "tsv" => Ok(ReportFormat::Tsv),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!("Unsupported report format: {}. Use: json, tsv, csv", s)),
        }
    }
}

/// Summary of one training run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub run_name: String,
    pub experiment_id: String,
    pub tracking_uri: String,
    pub dataset: String,
    pub dataset_digest: String,
    pub alpha: f64,
    pub l1_ratio: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub n_iter: usize,
    pub converged: bool,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub registered_model: Option<String>,
    pub registered_version: Option<String>,
}

impl RunReport {
    /// Ordered (field, value) rows for delimited output
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("run_id", self.run_id.clone()),
            ("run_name", self.run_name.clone()),
            ("experiment_id", self.experiment_id.clone()),
            ("tracking_uri", self.tracking_uri.clone()),
            ("dataset", self.dataset.clone()),
            ("dataset_digest", self.dataset_digest.clone()),
            ("alpha", self.alpha.to_string()),
            ("l1_ratio", self.l1_ratio.to_string()),
            ("n_train", self.n_train.to_string()),
            ("n_test", self.n_test.to_string()),
            ("n_iter", self.n_iter.to_string()),
            ("converged", self.converged.to_string()),
            ("rmse", format!("{:.6}", self.rmse)),
            ("mae", format!("{:.6}", self.mae)),
            ("r2", format!("{:.6}", self.r2)),
            ("registered_model", self.registered_model.clone().unwrap_or_else(|| "NA".to_string())),
            ("registered_version", self.registered_version.clone().unwrap_or_else(|| "NA".to_string())),
        ]
    }
}

fn write_delimited(file_path: &str, report: &RunReport, command_line: &str, sep: char) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create report file '{}': {}", file_path, e))?;
    let mut writer = BufWriter::new(file);

    // Write command header
    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# wine-enet v{}", env!("CARGO_PKG_VERSION")).map_err(|e| format!("Write error: {}", e))?;

    writeln!(writer, "field{}value", sep).map_err(|e| format!("Write error: {}", e))?;
    for (field, value) in report.rows() {
        writeln!(writer, "{}{}{}", field, sep, value).map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

fn write_json(file_path: &str, report: &RunReport, command_line: &str) -> Result<(), String> {
    #[derive(Serialize)]
    struct Envelope<'a> {
        command: &'a str,
        generated: String,
        version: &'static str,
        report: &'a RunReport,
    }

    ensure_parent_dir(file_path)?;
    let envelope = Envelope {
        command: command_line,
        generated: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        report,
    };
    let content = serde_json::to_string_pretty(&envelope).map_err(|e| format!("Failed to serialize report: {}", e))?;
    std::fs::write(file_path, content).map_err(|e| format!("Failed to write report file '{}': {}", file_path, e))
}

/// Write the run report in the specified format
pub fn write_report(file_path: &str, format: ReportFormat, report: &RunReport, command_line: &str) -> Result<(), String> {
    match format {
        ReportFormat::Json => write_json(file_path, report, command_line)?,
        ReportFormat::Tsv => write_delimited(file_path, report, command_line, '\t')?,
        ReportFormat::Csv => write_delimited(file_path, report, command_line, ',')?,
    }
    println!("✅ Run report written to: {}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            run_id: "abc".into(),
            run_name: "trial".into(),
            experiment_id: "0".into(),
            tracking_uri: "file:./mlruns".into(),
            dataset: "wine.csv".into(),
            dataset_digest: "deadbeef".into(),
            alpha: 0.5,
            l1_ratio: 0.5,
            n_train: 9,
            n_test: 3,
            n_iter: 4,
            converged: true,
            rmse: 0.5,
            mae: 0.25,
            r2: 0.125,
            registered_model: None,
            registered_version: None,
        }
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("tsv".parse::<ReportFormat>().unwrap(), ReportFormat::Tsv);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_write_tsv_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.tsv");
        let path = path.to_str().unwrap();
        write_report(path, ReportFormat::Tsv, &report(), "wine-enet 0.5 0.5").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Command: wine-enet 0.5 0.5\n"));
        assert!(content.contains("field\tvalue\n"));
        assert!(content.contains("rmse\t0.500000\n"));
        assert!(content.contains("registered_version\tNA\n"));
    }

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let path = path.to_str().unwrap();
        write_report(path, ReportFormat::Json, &report(), "cmd").unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["command"], "cmd");
        assert_eq!(value["report"]["n_test"], 3);
        assert_eq!(value["report"]["r2"], 0.125);
        assert!(value["report"]["registered_version"].is_null());
    }
}
