// validation.rs - Input validation utilities

use crate::cli::args::{Args, DEFAULT_DATA_URL};
use crate::core::ElasticNetParams;
use crate::data::{DataSource, SplitConfig};
use crate::output::ReportFormat;
use crate::tracking::{validate_key, TrackingUri, DEFAULT_TRACKING_URI};
use std::str::FromStr;

pub const DEFAULT_EXPERIMENT_NAME: &str = "Default";
pub const DEFAULT_REGISTERED_MODEL_NAME: &str = "ElasticnetWineModel";
pub const DEFAULT_TARGET: &str = "quality";

/// Fully resolved settings of one training invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub params: ElasticNetParams,
    pub split: SplitConfig,
    pub data_source: DataSource,
    pub separator: u8,
    pub target: String,
    pub tracking_uri: TrackingUri,
    pub experiment_name: String,
    pub run_name: Option<String>,
    /// None when registration is disabled
    pub registered_model_name: Option<String>,
    pub report_format: ReportFormat,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.hyperparams.len() > 2 {
        return Err(format!(
            "Expected at most two positional arguments (alpha l1_ratio), got {}",
            args.hyperparams.len()
        ));
    }

    // Hyperparameters
    let defaults = ElasticNetParams::default();
    let params = ElasticNetParams {
        alpha: args.effective_alpha().unwrap_or(defaults.alpha),
        l1_ratio: args.effective_l1_ratio().unwrap_or(defaults.l1_ratio),
        max_iter: args.max_iter.unwrap_or(defaults.max_iter),
        tol: args.tol.unwrap_or(defaults.tol),
        fit_intercept: true,
    };
    params.validate()?;

    // Split
    let split_defaults = SplitConfig::default();
    let split = SplitConfig {
        test_size: args.test_size.unwrap_or(split_defaults.test_size),
        seed: args.seed.unwrap_or(split_defaults.seed),
    };
    if !(split.test_size > 0.0 && split.test_size < 1.0) {
        return Err(format!("Test size must be between 0.0 and 1.0 (exclusive), got {}", split.test_size));
    }

    // Dataset
    let data_source = DataSource::parse(args.data.as_deref().unwrap_or(DEFAULT_DATA_URL));
    let separator = parse_separator(args.separator.as_deref().unwrap_or(";"))?;
    let target = args.target.clone().unwrap_or_else(|| DEFAULT_TARGET.to_string());
    if target.trim().is_empty() {
        return Err("Target column must not be empty".to_string());
    }

    // Tracking
    let tracking_uri = TrackingUri::parse(args.tracking_uri.as_deref().unwrap_or(DEFAULT_TRACKING_URI))?;
    let experiment_name = args
        .experiment_name
        .clone()
        .unwrap_or_else(|| DEFAULT_EXPERIMENT_NAME.to_string());
    if experiment_name.trim().is_empty() {
        return Err("Experiment name must not be empty".to_string());
    }
    let run_name = args.run_name.clone().filter(|name| !name.trim().is_empty());

    let registered_model_name = if args.no_register {
        None
    } else {
        let name = args
            .registered_model_name
            .clone()
            .unwrap_or_else(|| DEFAULT_REGISTERED_MODEL_NAME.to_string());
        validate_key(&name).map_err(|e| format!("Invalid registered model name: {}", e))?;
        Some(name)
    };

    let report_format = ReportFormat::from_str(&args.report_format)?;

    Ok(ValidationResult {
        params,
        split,
        data_source,
        separator,
        target,
        tracking_uri,
        experiment_name,
        run_name,
        registered_model_name,
        report_format,
    })
}

/// Accept a single ASCII character, or the escape `\t`
fn parse_separator(raw: &str) -> Result<u8, String> {
    if raw == "\\t" || raw == "tab" {
        return Ok(b'\t');
    }
    let bytes = raw.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        return Err(format!("Separator must be a single ASCII character, got '{}'", raw));
    }
    Ok(bytes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let result = validate_args(&Args::empty()).unwrap();
        assert_eq!(result.params, ElasticNetParams::default());
        assert_eq!(result.split, SplitConfig::default());
        assert_eq!(result.data_source, DataSource::Url(DEFAULT_DATA_URL.to_string()));
        assert_eq!(result.separator, b';');
        assert_eq!(result.target, "quality");
        assert_eq!(result.tracking_uri, TrackingUri::File("./mlruns".into()));
        assert_eq!(result.experiment_name, "Default");
        assert_eq!(result.run_name, None);
        assert_eq!(result.registered_model_name.as_deref(), Some("ElasticnetWineModel"));
        assert_eq!(result.report_format, ReportFormat::Json);
    }

    #[test]
    fn test_hyperparameter_ranges() {
        let mut args = Args::empty();
        args.hyperparams = vec![-0.1];
        assert!(validate_args(&args).is_err());

        args.hyperparams = vec![0.1, 1.5];
        assert!(validate_args(&args).is_err());

        args.hyperparams = vec![0.0, 1.0];
        let result = validate_args(&args).unwrap();
        assert_eq!(result.params.alpha, 0.0);
        assert_eq!(result.params.l1_ratio, 1.0);

        args.hyperparams = vec![0.1, 0.2, 0.3];
        assert!(validate_args(&args).unwrap_err().contains("at most two"));
    }

    #[test]
    fn test_invalid_split_and_separator() {
        let mut args = Args::empty();
        args.test_size = Some(1.0);
        assert!(validate_args(&args).is_err());

        let mut args = Args::empty();
        args.separator = Some(";;".to_string());
        assert!(validate_args(&args).is_err());

        let mut args = Args::empty();
        args.separator = Some("\\t".to_string());
        assert_eq!(validate_args(&args).unwrap().separator, b'\t');
    }

    #[test]
    fn test_tracking_settings() {
        let mut args = Args::empty();
        args.tracking_uri = Some("http://localhost:5000/".to_string());
        args.no_register = true;
        args.run_name = Some("  ".to_string());
        let result = validate_args(&args).unwrap();
        assert_eq!(result.tracking_uri, TrackingUri::Http("http://localhost:5000".to_string()));
        assert_eq!(result.registered_model_name, None);
        assert_eq!(result.run_name, None);

        let mut args = Args::empty();
        args.tracking_uri = Some("sqlite:///mlflow.db".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_unknown_report_format() {
        let mut args = Args::empty();
        args.report_format = "xml".to_string();
        assert!(validate_args(&args).is_err());
    }
}
