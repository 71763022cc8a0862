// file_store.rs - Local MLflow-compatible file store (mlruns/ layout)

use super::traits::{now_millis, validate_key, Metric, Param, RunInfo, RunStatus, RunTag, Tracker};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

const DEFAULT_EXPERIMENT_ID: &str = "0";
const DEFAULT_EXPERIMENT_NAME: &str = "Default";
const META_FILE: &str = "meta.yaml";
const TRASH_DIR: &str = ".trash";
const MODEL_HISTORY_TAG: &str = "mlflow.log-model.history";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExperimentMeta {
    artifact_location: String,
    creation_time: Option<i64>,
    experiment_id: String,
    last_update_time: Option<i64>,
    lifecycle_stage: String,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunMeta {
    artifact_uri: String,
    end_time: Option<i64>,
    entry_point_name: String,
    experiment_id: String,
    lifecycle_stage: String,
    run_id: String,
    run_name: String,
    run_uuid: String,
    source_name: String,
    source_type: i32,
    source_version: String,
    start_time: i64,
    status: i32,
    tags: Vec<String>,
    user_id: String,
}

/// Tracker writing experiments and runs under a local directory
#[derive(Debug, Clone)]
pub struct FileStoreTracker {
    root: PathBuf,
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let content = serde_yaml::to_string(value).map_err(|e| format!("Failed to serialize '{}': {}", path.display(), e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory '{}': {}", parent.display(), e))?;
    }
    fs::write(path, contents).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

/// Reject absolute paths and parent traversal in artifact paths
fn safe_relative(path: &str) -> Result<PathBuf, String> {
    let candidate = Path::new(path);
    if path.is_empty() || candidate.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(format!("Invalid artifact path '{}': must be a non-empty relative path", path));
    }
    Ok(candidate.to_path_buf())
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

impl FileStoreTracker {
    /// Open (and create if needed) a store rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, String> {
        let root = root.as_ref();
        create_dir_all(root)
            .map_err(|e| format!("Failed to create tracking directory '{}': {}", root.display(), e))?;
        let root = fs::canonicalize(root)
            .map_err(|e| format!("Failed to resolve tracking directory '{}': {}", root.display(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active experiments plus deleted ones, whether still in place or moved to `.trash/`
    fn experiments(&self) -> Result<Vec<ExperimentMeta>, String> {
        let mut experiments = Vec::new();
        for dir in [self.root.clone(), self.root.join(TRASH_DIR)] {
            if !dir.is_dir() {
                continue;
            }
            let entries = fs::read_dir(&dir).map_err(|e| format!("Failed to list '{}': {}", dir.display(), e))?;
            for entry in entries.flatten() {
                let meta_path = entry.path().join(META_FILE);
                if entry.path().is_dir() && meta_path.is_file() {
                    experiments.push(read_yaml::<ExperimentMeta>(&meta_path)?);
                }
            }
        }
        Ok(experiments)
    }

    fn create_experiment(&self, name: &str, existing: &[ExperimentMeta]) -> Result<String, String> {
        let experiment_id = if name == DEFAULT_EXPERIMENT_NAME
            && !existing.iter().any(|e| e.experiment_id == DEFAULT_EXPERIMENT_ID)
        {
            DEFAULT_EXPERIMENT_ID.to_string()
        } else {
            let next = existing
                .iter()
                .filter_map(|e| e.experiment_id.parse::<u64>().ok())
                .max()
                .map_or(1, |max| max + 1);
            next.to_string()
        };

        let dir = self.root.join(&experiment_id);
        create_dir_all(&dir).map_err(|e| format!("Failed to create experiment '{}': {}", dir.display(), e))?;

        let now = now_millis();
        let meta = ExperimentMeta {
            artifact_location: file_uri(&dir),
            creation_time: Some(now),
            experiment_id: experiment_id.clone(),
            last_update_time: Some(now),
            lifecycle_stage: "active".to_string(),
            name: name.to_string(),
        };
        write_yaml(&dir.join(META_FILE), &meta)?;
        println!("🧪 Created experiment '{}' (id {})", name, experiment_id);
        Ok(experiment_id)
    }

    fn run_dir(&self, run_id: &str) -> Result<PathBuf, String> {
        for experiment in self.experiments()? {
            let dir = self.root.join(&experiment.experiment_id).join(run_id);
            if dir.join(META_FILE).is_file() {
                return Ok(dir);
            }
        }
        Err(format!("Run '{}' not found in '{}'", run_id, self.root.display()))
    }

    fn write_tag(&self, run_dir: &Path, tag: &RunTag) -> Result<(), String> {
        validate_key(&tag.key)?;
        write_file(&run_dir.join("tags").join(&tag.key), tag.value.as_bytes())
    }
}

impl Tracker for FileStoreTracker {
    fn name(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        file_uri(&self.root)
    }

    fn supports_model_registry(&self) -> bool {
        false
    }

    fn get_or_create_experiment(&self, name: &str) -> Result<String, String> {
        let existing = self.experiments()?;
        if let Some(found) = existing.iter().find(|e| e.name == name) {
            if found.lifecycle_stage != "active" {
                return Err(format!(
                    "Experiment '{}' (id {}) is deleted; restore it or remove it from '{}' before reusing the name",
                    name,
                    found.experiment_id,
                    self.root.display()
                ));
            }
            return Ok(found.experiment_id.clone());
        }
        self.create_experiment(name, &existing)
    }

    fn create_run(&self, experiment_id: &str, run_name: &str, start_time: i64, tags: &[RunTag]) -> Result<RunInfo, String> {
        let experiment_dir = self.root.join(experiment_id);
        if !experiment_dir.join(META_FILE).is_file() {
            return Err(format!("Experiment '{}' does not exist", experiment_id));
        }

        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let run_dir = experiment_dir.join(&run_id);
        for sub in ["params", "metrics", "tags", "artifacts"] {
            create_dir_all(run_dir.join(sub))
                .map_err(|e| format!("Failed to create run directory '{}': {}", run_dir.display(), e))?;
        }

        let user_id = tags
            .iter()
            .find(|t| t.key == "mlflow.user")
            .map(|t| t.value.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let source_name = tags
            .iter()
            .find(|t| t.key == "mlflow.source.name")
            .map(|t| t.value.clone())
            .unwrap_or_default();

        let artifact_uri = file_uri(&run_dir.join("artifacts"));
        let meta = RunMeta {
            artifact_uri: artifact_uri.clone(),
            end_time: None,
            entry_point_name: String::new(),
            experiment_id: experiment_id.to_string(),
            lifecycle_stage: "active".to_string(),
            run_id: run_id.clone(),
            run_name: run_name.to_string(),
            run_uuid: run_id.clone(),
            source_name,
            // SourceType.LOCAL
            source_type: 4,
            source_version: String::new(),
            start_time,
            status: RunStatus::Running.code(),
            tags: Vec::new(),
            user_id,
        };
        write_yaml(&run_dir.join(META_FILE), &meta)?;

        self.write_tag(&run_dir, &RunTag::new("mlflow.runName", run_name))?;
        for tag in tags {
            self.write_tag(&run_dir, tag)?;
        }

        Ok(RunInfo {
            run_id,
            experiment_id: experiment_id.to_string(),
            run_name: run_name.to_string(),
            artifact_uri,
        })
    }

    fn log_batch(&self, run_id: &str, params: &[Param], metrics: &[Metric], tags: &[RunTag]) -> Result<(), String> {
        let run_dir = self.run_dir(run_id)?;

        for param in params {
            validate_key(&param.key)?;
            let path = run_dir.join("params").join(&param.key);
            if path.is_file() {
                let current = fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
                if current != param.value {
                    return Err(format!(
                        "Param '{}' already logged with value '{}', cannot change it to '{}'",
                        param.key, current, param.value
                    ));
                }
                continue;
            }
            write_file(&path, param.value.as_bytes())?;
        }

        for metric in metrics {
            validate_key(&metric.key)?;
            let path = run_dir.join("metrics").join(&metric.key);
            if let Some(parent) = path.parent() {
                create_dir_all(parent)
                    .map_err(|e| format!("Failed to create directory '{}': {}", parent.display(), e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
            writeln!(file, "{} {} {}", metric.timestamp, metric.value, metric.step)
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        }

        for tag in tags {
            self.write_tag(&run_dir, tag)?;
        }
        Ok(())
    }

    fn log_artifact(&self, run: &RunInfo, artifact_path: &str, contents: &[u8]) -> Result<(), String> {
        let relative = safe_relative(artifact_path)?;
        let path = self.run_dir(&run.run_id)?.join("artifacts").join(relative);
        write_file(&path, contents)
    }

    fn log_model_metadata(&self, run_id: &str, model_json: &str) -> Result<(), String> {
        let run_dir = self.run_dir(run_id)?;
        let path = run_dir.join("tags").join(MODEL_HISTORY_TAG);

        let mut history: Vec<serde_json::Value> = if path.is_file() {
            let content = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            serde_json::from_str(&content).map_err(|e| format!("Corrupt model history '{}': {}", path.display(), e))?
        } else {
            Vec::new()
        };
        let entry: serde_json::Value =
            serde_json::from_str(model_json).map_err(|e| format!("Invalid model metadata JSON: {}", e))?;
        history.push(entry);

        let content = serde_json::to_string(&history).map_err(|e| format!("Failed to serialize model history: {}", e))?;
        write_file(&path, content.as_bytes())
    }

    fn end_run(&self, run_id: &str, status: RunStatus, end_time: i64) -> Result<(), String> {
        let meta_path = self.run_dir(run_id)?.join(META_FILE);
        let mut meta: RunMeta = read_yaml(&meta_path)?;
        meta.status = status.code();
        meta.end_time = Some(end_time);
        write_yaml(&meta_path, &meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStoreTracker) {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FileStoreTracker::new(dir.path().join("mlruns")).unwrap();
        (dir, tracker)
    }

    #[test]
    fn test_default_experiment_gets_id_zero() {
        let (_dir, tracker) = store();
        assert_eq!(tracker.get_or_create_experiment("Default").unwrap(), "0");
        assert_eq!(tracker.get_or_create_experiment("Default").unwrap(), "0");
        assert_eq!(tracker.get_or_create_experiment("wine").unwrap(), "1");
        assert_eq!(tracker.get_or_create_experiment("other").unwrap(), "2");
        assert_eq!(tracker.get_or_create_experiment("wine").unwrap(), "1");

        let meta: ExperimentMeta = read_yaml(&tracker.root().join("1").join(META_FILE)).unwrap();
        assert_eq!(meta.name, "wine");
        assert!(meta.artifact_location.starts_with("file://"));
    }

    #[test]
    fn test_deleted_experiment_name_is_not_reused() {
        let (_dir, tracker) = store();
        assert_eq!(tracker.get_or_create_experiment("wine").unwrap(), "1");

        let meta_path = tracker.root().join("1").join(META_FILE);
        let meta = fs::read_to_string(&meta_path).unwrap();
        fs::write(&meta_path, meta.replace("lifecycle_stage: active", "lifecycle_stage: deleted")).unwrap();

        let err = tracker.get_or_create_experiment("wine").unwrap_err();
        assert!(err.contains("deleted"), "{}", err);
        assert!(!tracker.root().join("2").exists());
        assert_eq!(tracker.get_or_create_experiment("other").unwrap(), "2");
    }

    #[test]
    fn test_trashed_experiment_blocks_name_and_id() {
        let (_dir, tracker) = store();
        assert_eq!(tracker.get_or_create_experiment("wine").unwrap(), "1");

        let trash = tracker.root().join(TRASH_DIR);
        fs::create_dir_all(&trash).unwrap();
        let meta_path = tracker.root().join("1").join(META_FILE);
        let meta = fs::read_to_string(&meta_path).unwrap();
        fs::rename(tracker.root().join("1"), trash.join("1")).unwrap();
        fs::write(
            trash.join("1").join(META_FILE),
            meta.replace("lifecycle_stage: active", "lifecycle_stage: deleted"),
        )
        .unwrap();

        assert!(tracker.get_or_create_experiment("wine").is_err());
        assert_eq!(tracker.get_or_create_experiment("red").unwrap(), "2");
    }

    #[test]
    fn test_run_lifecycle_writes_mlflow_layout() {
        let (_dir, tracker) = store();
        let exp = tracker.get_or_create_experiment("Default").unwrap();
        let run = tracker
            .create_run(&exp, "trial", 1000, &[RunTag::new("mlflow.user", "tester")])
            .unwrap();
        let run_dir = tracker.root().join(&exp).join(&run.run_id);

        tracker
            .log_batch(
                &run.run_id,
                &[Param::new("alpha", 0.5)],
                &[Metric::new("rmse", 0.75, 2000)],
                &[RunTag::new("dataset.digest", "abcd1234")],
            )
            .unwrap();
        tracker.log_artifact(&run, "model/model.json", b"{}").unwrap();
        tracker.end_run(&run.run_id, RunStatus::Finished, 3000).unwrap();

        assert_eq!(fs::read_to_string(run_dir.join("params/alpha")).unwrap(), "0.5");
        assert_eq!(fs::read_to_string(run_dir.join("metrics/rmse")).unwrap(), "2000 0.75 0\n");
        assert_eq!(fs::read_to_string(run_dir.join("tags/mlflow.runName")).unwrap(), "trial");
        assert_eq!(fs::read_to_string(run_dir.join("tags/dataset.digest")).unwrap(), "abcd1234");
        assert_eq!(fs::read(run_dir.join("artifacts/model/model.json")).unwrap(), b"{}");

        let meta: RunMeta = read_yaml(&run_dir.join(META_FILE)).unwrap();
        assert_eq!(meta.status, 3);
        assert_eq!(meta.end_time, Some(3000));
        assert_eq!(meta.user_id, "tester");
    }

    #[test]
    fn test_params_are_immutable() {
        let (_dir, tracker) = store();
        let exp = tracker.get_or_create_experiment("Default").unwrap();
        let run = tracker.create_run(&exp, "r", 0, &[]).unwrap();

        tracker.log_batch(&run.run_id, &[Param::new("alpha", 0.5)], &[], &[]).unwrap();
        tracker.log_batch(&run.run_id, &[Param::new("alpha", 0.5)], &[], &[]).unwrap();
        assert!(tracker.log_batch(&run.run_id, &[Param::new("alpha", 0.7)], &[], &[]).is_err());
    }

    #[test]
    fn test_model_history_appends() {
        let (_dir, tracker) = store();
        let exp = tracker.get_or_create_experiment("Default").unwrap();
        let run = tracker.create_run(&exp, "r", 0, &[]).unwrap();

        tracker.log_model_metadata(&run.run_id, r#"{"artifact_path":"model"}"#).unwrap();
        tracker.log_model_metadata(&run.run_id, r#"{"artifact_path":"model2"}"#).unwrap();

        let path = tracker.root().join(&exp).join(&run.run_id).join("tags").join(MODEL_HISTORY_TAG);
        let history: Vec<serde_json::Value> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["artifact_path"], "model2");
    }

    #[test]
    fn test_rejects_unsafe_paths_and_unknown_runs() {
        let (_dir, tracker) = store();
        let exp = tracker.get_or_create_experiment("Default").unwrap();
        let run = tracker.create_run(&exp, "r", 0, &[]).unwrap();

        assert!(tracker.log_artifact(&run, "../escape", b"x").is_err());
        assert!(tracker.log_artifact(&run, "/abs", b"x").is_err());
        assert!(tracker.end_run("missing", RunStatus::Failed, 0).is_err());
        assert!(tracker.register_model("m", "src", &run.run_id).is_err());
        assert!(tracker.create_run("42", "r", 0, &[]).is_err());
    }
}
