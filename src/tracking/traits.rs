// traits.rs - Core traits and types for experiment tracking backends

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::OnceLock;

/// Hyperparameter logged once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// Metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub value: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub step: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTag {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl Metric {
    pub fn new(key: &str, value: f64, timestamp: i64) -> Self {
        Self {
            key: key.to_string(),
            value,
            timestamp,
            step: 0,
        }
    }
}

impl RunTag {
    pub fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Identity of a created run
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub run_id: String,
    pub experiment_id: String,
    pub run_name: String,
    /// Root under which the run's artifacts live
    pub artifact_uri: String,
}

/// Terminal and non-terminal run states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

impl RunStatus {
    /// Name used by the REST API
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }

    /// Numeric code used in file store meta.yaml
    pub fn code(&self) -> i32 {
        match self {
            RunStatus::Running => 1,
            RunStatus::Finished => 3,
            RunStatus::Failed => 4,
        }
    }
}

/// Trait for experiment tracking backends
/// Each backend owns how experiments, runs and artifacts are persisted
pub trait Tracker: Debug {
    /// Short backend name
    fn name(&self) -> &'static str;

    /// Where this tracker writes (path or server URL)
    fn location(&self) -> String;

    /// Whether models can be registered by name
    fn supports_model_registry(&self) -> bool;

    /// Look up an experiment by name, creating it when missing; returns its id
    fn get_or_create_experiment(&self, name: &str) -> Result<String, String>;

    /// Start a new run in RUNNING state
    fn create_run(&self, experiment_id: &str, run_name: &str, start_time: i64, tags: &[RunTag]) -> Result<RunInfo, String>;

    /// Record params, metrics and tags for a run
    fn log_batch(&self, run_id: &str, params: &[Param], metrics: &[Metric], tags: &[RunTag]) -> Result<(), String>;

    /// Store one artifact file at `artifact_path` relative to the run's artifact root
    fn log_artifact(&self, run: &RunInfo, artifact_path: &str, contents: &[u8]) -> Result<(), String>;

    /// Attach MLmodel metadata (as JSON) to the run's model history
    fn log_model_metadata(&self, run_id: &str, model_json: &str) -> Result<(), String>;

    /// Register a model version from `source`; returns the version
    fn register_model(&self, name: &str, source: &str, run_id: &str) -> Result<String, String> {
        let _ = (source, run_id);
        Err(format!("{} tracker does not support registering model '{}'", self.name(), name))
    }

    /// Mark the run as terminated
    fn end_run(&self, run_id: &str, status: RunStatus, end_time: i64) -> Result<(), String>;
}

fn key_regex() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r"^[/\w.\- ]*$").expect("static key regex"))
}

/// Validate a param/metric/tag key the way MLflow does
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("Key must not be empty".to_string());
    }
    if key.len() > 250 {
        let prefix: String = key.chars().take(32).collect();
        return Err(format!("Key '{}...' exceeds 250 characters", prefix));
    }
    if !key_regex().is_match(key) {
        return Err(format!(
            "Invalid key '{}': names may only contain alphanumerics, underscores (_), dashes (-), periods (.), spaces ( ), and slashes (/)",
            key
        ));
    }
    if key.starts_with('/') || key.split('/').any(|part| part == ".." || part == ".") {
        return Err(format!("Invalid key '{}': must be a relative path without '.' or '..' segments", key));
    }
    Ok(())
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
