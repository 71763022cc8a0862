// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Hyperparameters
    pub alpha: Option<f64>,
    pub l1_ratio: Option<f64>,
    pub max_iter: Option<usize>,
    pub tol: Option<f64>,

    // Dataset
    pub data: Option<String>,
    pub separator: Option<String>,
    pub target: Option<String>,
    pub test_size: Option<f64>,
    pub seed: Option<u64>,

    // Tracking
    pub tracking_uri: Option<String>,
    pub experiment_name: Option<String>,
    pub run_name: Option<String>,
    pub registered_model_name: Option<String>,
    pub no_register: Option<bool>,

    // Output
    pub report: Option<String>,
    pub report_format: Option<String>,
    pub save_model: Option<String>,

    // Flags
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# wine-enet.toml - Configuration file for wine-enet
# Command line arguments will override these settings

# =============================================================================
# HYPERPARAMETERS
# =============================================================================

# Penalty strength (positional argument 1)
alpha = 0.5

# Mix between L1 and L2 penalty: 0.0 = ridge, 1.0 = lasso (positional argument 2)
l1_ratio = 0.5

# Maximum coordinate descent sweeps
max_iter = 1000

# Convergence tolerance on the duality gap
tol = 0.0001

# =============================================================================
# DATASET
# =============================================================================

# Dataset URL or local path
data = "https://raw.githubusercontent.com/mlflow/mlflow/master/tests/datasets/winequality-red.csv"

# Field separator
separator = ";"

# Column to predict
target = "quality"

# Fraction of rows held out for evaluation
test_size = 0.25

# Seed of the train/test shuffle
seed = 42

# =============================================================================
# TRACKING
# =============================================================================

# Local path, file: URI, http:// or https:// tracking server
# Falls back to $MLFLOW_TRACKING_URI, then ./mlruns
tracking_uri = "./mlruns"

# Experiment name (falls back to $MLFLOW_EXPERIMENT_NAME, then Default)
experiment_name = "Default"

# Optional run name
# run_name = "enet-baseline"

# Registered model name (ignored by local file stores)
registered_model_name = "ElasticnetWineModel"

# Log the model without registering it
no_register = false

# =============================================================================
# OUTPUT
# =============================================================================

# Optional run report
# report = "run_report.json"

# Report format: json, tsv, csv
report_format = "json"

# Optional local copy of the packaged model
# save_model = "model_out"

# =============================================================================
# FLAGS
# =============================================================================

# Load and split the dataset, then exit without training
dry_run = false
"#
        .to_string()
    }
}
