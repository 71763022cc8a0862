// lib.rs - wine-enet library root

//! # wine-enet - ElasticNet regression on the wine-quality dataset with MLflow tracking
//!
//! This library loads the red wine-quality table, holds out a reproducible test
//! split, fits an ElasticNet regressor with linfa-elasticnet, and records the
//! hyperparameters, test metrics and the packaged model to an MLflow tracking
//! destination (a local `mlruns/` file store or a tracking server).
//!
//! ## Features
//!
//! - **ElasticNet**: L1/L2 penalised least squares with duality-gap convergence
//! - **Reproducible split**: seeded shuffle of the dataset rows
//! - **MLflow tracking**: local file store and REST API clients behind one trait
//! - **Model packaging**: `MLmodel` descriptor with an inferred signature
//! - **Run reports**: JSON, TSV and CSV summaries
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use wine_enet::prelude::*;
//!
//! let settings = validate_args(&Args::empty())?;
//! let dataset = settings.data_source.load(settings.separator)?;
//! let tracker = TrackerRegistry::new().open(&settings.tracking_uri, &TrackerOptions::default())?;
//! let summary = run_training(&settings, &dataset, tracker.as_ref())?;
//! println!("RMSE: {:.4}", summary.metrics.rmse);
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod experiment;
pub mod output;
pub mod tracking;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::core::{eval_metrics, ElasticNetModel, ElasticNetParams, EvalMetrics, ModelSignature};
    pub use crate::data::{train_test_split, DataSource, Dataset, FeatureMatrix, SplitConfig};
    pub use crate::experiment::{run_training, RunSummary};
    pub use crate::output::{package_model, write_report, ModelPackage, ReportFormat, RunReport};
    pub use crate::tracking::{FileStoreTracker, RestTracker, Tracker, TrackerOptions, TrackerRegistry, TrackingUri};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{ElasticNetModel, ElasticNetParams, EvalMetrics};
pub use data::{Dataset, FeatureMatrix};
pub use tracking::{Tracker, TrackerRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "wine-enet v{} - ElasticNet wine-quality trainer with MLflow tracking",
        VERSION
    )
}
