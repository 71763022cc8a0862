// rest.rs - MLflow tracking server client (REST API 2.0)

use super::traits::{validate_key, Metric, Param, RunInfo, RunStatus, RunTag, Tracker};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Error types for tracking server calls
#[derive(Debug)]
pub enum RestError {
    /// Connection, timeout or body read failure
    Transport(String),
    /// Server answered with an MLflow error payload
    Api {
        status: u16,
        error_code: String,
        message: String,
    },
    /// Response body did not match the expected shape
    Decode(String),
}

impl RestError {
    fn has_code(&self, code: &str) -> bool {
        matches!(self, RestError::Api { error_code, .. } if error_code == code)
    }
}

impl Display for RestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RestError::Transport(msg) => write!(f, "Request failed: {}", msg),
            RestError::Api {
                status,
                error_code,
                message,
            } => write!(f, "MLflow API error [{} {}]: {}", status, error_code, message),
            RestError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for RestError {}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: ExperimentBody,
}

#[derive(Debug, Deserialize)]
struct ExperimentBody {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: RunBody,
}

#[derive(Debug, Deserialize)]
struct RunBody {
    info: RunInfoBody,
}

#[derive(Debug, Deserialize)]
struct RunInfoBody {
    run_id: String,
    experiment_id: String,
    #[serde(default)]
    run_name: Option<String>,
    artifact_uri: String,
}

#[derive(Debug, Deserialize)]
struct CreateModelVersionResponse {
    model_version: ModelVersionBody,
}

#[derive(Debug, Deserialize)]
struct ModelVersionBody {
    version: String,
}

#[derive(Debug, Serialize)]
struct LogBatchRequest<'a> {
    run_id: &'a str,
    metrics: &'a [Metric],
    params: &'a [Param],
    tags: &'a [RunTag],
}

/// Where an artifact upload goes
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactTarget {
    /// PUT through the server's artifact proxy
    Proxy(String),
    /// Artifact root is a local directory
    Local(PathBuf),
}

/// Tracker talking to a remote MLflow server
#[derive(Debug, Clone)]
pub struct RestTracker {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl RestTracker {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(concat!("wine-enet/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn parse_response<R: DeserializeOwned>(response: Response) -> Result<R, RestError> {
        let status = response.status();
        let text = response.text().map_err(|e| RestError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
            let (error_code, message) = match body {
                Some(b) => (
                    b.error_code.unwrap_or_else(|| "UNKNOWN".to_string()),
                    b.message.unwrap_or_else(|| text.clone()),
                ),
                None => ("UNKNOWN".to_string(), text.clone()),
            };
            return Err(RestError::Api {
                status: status.as_u16(),
                error_code,
                message,
            });
        }

        let payload = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(payload).map_err(|e| RestError::Decode(format!("{} (body: {})", e, text)))
    }

    fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, RestError> {
        let response = self
            .authorize(self.client.post(self.api_url(path)))
            .json(body)
            .send()
            .map_err(|e| RestError::Transport(e.to_string()))?;
        Self::parse_response(response)
    }

    fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<R, RestError> {
        let response = self
            .authorize(self.client.get(self.api_url(path)))
            .query(query)
            .send()
            .map_err(|e| RestError::Transport(e.to_string()))?;
        Self::parse_response(response)
    }

    /// Resolve where `artifact_path` under the run's artifact root should be written
    pub fn artifact_target(&self, artifact_uri: &str, artifact_path: &str) -> Result<ArtifactTarget, String> {
        let artifact_path = artifact_path.trim_start_matches('/');

        if let Some(rest) = artifact_uri.strip_prefix("mlflow-artifacts:") {
            // mlflow-artifacts:/<path> or mlflow-artifacts://<host>/<path>
            let path = match rest.strip_prefix("//") {
                Some(after) => after.find('/').map(|idx| &after[idx..]).unwrap_or(""),
                None => rest,
            };
            let path = path.trim_matches('/');
            return Ok(ArtifactTarget::Proxy(format!(
                "{}/api/2.0/mlflow-artifacts/artifacts/{}/{}",
                self.base_url, path, artifact_path
            )));
        }

        if let Some(rest) = artifact_uri.strip_prefix("file://") {
            return Ok(ArtifactTarget::Local(PathBuf::from(rest).join(artifact_path)));
        }
        if artifact_uri.starts_with('/') {
            return Ok(ArtifactTarget::Local(PathBuf::from(artifact_uri).join(artifact_path)));
        }

        Err(format!(
            "Artifact root '{}' is not reachable through the tracking server; start the server with --serve-artifacts",
            artifact_uri
        ))
    }
}

impl Tracker for RestTracker {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }

    fn supports_model_registry(&self) -> bool {
        true
    }

    fn get_or_create_experiment(&self, name: &str) -> Result<String, String> {
        match self.get::<GetExperimentResponse>("experiments/get-by-name", &[("experiment_name", name)]) {
            Ok(found) => return Ok(found.experiment.experiment_id),
            Err(e) if e.has_code("RESOURCE_DOES_NOT_EXIST") => {}
            Err(e) => return Err(format!("Failed to look up experiment '{}': {}", name, e)),
        }

        let created: CreateExperimentResponse = self
            .post("experiments/create", &json!({ "name": name }))
            .map_err(|e| format!("Failed to create experiment '{}': {}", name, e))?;
        println!("🧪 Created experiment '{}' (id {})", name, created.experiment_id);
        Ok(created.experiment_id)
    }

    fn create_run(&self, experiment_id: &str, run_name: &str, start_time: i64, tags: &[RunTag]) -> Result<RunInfo, String> {
        for tag in tags {
            validate_key(&tag.key)?;
        }
        let user_id = tags
            .iter()
            .find(|t| t.key == "mlflow.user")
            .map(|t| t.value.as_str())
            .unwrap_or("");

        let body = json!({
            "experiment_id": experiment_id,
            "run_name": run_name,
            "start_time": start_time,
            "user_id": user_id,
            "tags": tags,
        });
        let created: CreateRunResponse = self
            .post("runs/create", &body)
            .map_err(|e| format!("Failed to create run: {}", e))?;

        let info = created.run.info;
        Ok(RunInfo {
            run_id: info.run_id,
            experiment_id: info.experiment_id,
            run_name: info.run_name.unwrap_or_else(|| run_name.to_string()),
            artifact_uri: info.artifact_uri,
        })
    }

    fn log_batch(&self, run_id: &str, params: &[Param], metrics: &[Metric], tags: &[RunTag]) -> Result<(), String> {
        for key in params
            .iter()
            .map(|p| &p.key)
            .chain(metrics.iter().map(|m| &m.key))
            .chain(tags.iter().map(|t| &t.key))
        {
            validate_key(key)?;
        }

        let request = LogBatchRequest {
            run_id,
            metrics,
            params,
            tags,
        };
        self.post::<_, serde_json::Value>("runs/log-batch", &request)
            .map(|_| ())
            .map_err(|e| format!("Failed to log batch for run {}: {}", run_id, e))
    }

    fn log_artifact(&self, run: &RunInfo, artifact_path: &str, contents: &[u8]) -> Result<(), String> {
        match self.artifact_target(&run.artifact_uri, artifact_path)? {
            ArtifactTarget::Proxy(url) => {
                let response = self
                    .authorize(self.client.put(&url))
                    .body(contents.to_vec())
                    .send()
                    .map_err(|e| format!("Failed to upload artifact '{}': {}", artifact_path, e))?;
                Self::parse_response::<serde_json::Value>(response)
                    .map(|_| ())
                    .map_err(|e| format!("Failed to upload artifact '{}': {}", artifact_path, e))
            }
            ArtifactTarget::Local(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create directory '{}': {}", parent.display(), e))?;
                }
                std::fs::write(&path, contents)
                    .map_err(|e| format!("Failed to write artifact '{}': {}", path.display(), e))
            }
        }
    }

    fn log_model_metadata(&self, run_id: &str, model_json: &str) -> Result<(), String> {
        self.post::<_, serde_json::Value>("runs/log-model", &json!({ "run_id": run_id, "model_json": model_json }))
            .map(|_| ())
            .map_err(|e| format!("Failed to log model metadata for run {}: {}", run_id, e))
    }

    fn register_model(&self, name: &str, source: &str, run_id: &str) -> Result<String, String> {
        match self.post::<_, serde_json::Value>("registered-models/create", &json!({ "name": name })) {
            Ok(_) => println!("📚 Registered new model '{}'", name),
            Err(e) if e.has_code("RESOURCE_ALREADY_EXISTS") => {}
            Err(e) => return Err(format!("Failed to register model '{}': {}", name, e)),
        }

        let created: CreateModelVersionResponse = self
            .post(
                "model-versions/create",
                &json!({ "name": name, "source": source, "run_id": run_id }),
            )
            .map_err(|e| format!("Failed to create a version of model '{}': {}", name, e))?;
        Ok(created.model_version.version)
    }

    fn end_run(&self, run_id: &str, status: RunStatus, end_time: i64) -> Result<(), String> {
        let body = json!({ "run_id": run_id, "status": status.as_str(), "end_time": end_time });
        self.post::<_, serde_json::Value>("runs/update", &body)
            .map(|_| ())
            .map_err(|e| format!("Failed to update run {}: {}", run_id, e))
    }
}
