// experiment.rs - Train, evaluate and track one ElasticNet run

use crate::cli::ValidationResult;
use crate::core::{eval_metrics, ElasticNetModel, EvalMetrics, ModelSignature};
use crate::data::{train_test_split, Dataset};
use crate::output::{package_model, ModelPackage, RunReport};
use crate::tracking::{now_millis, Metric, Param, RunInfo, RunStatus, RunTag, Tracker};

/// Artifact directory the model is logged under
pub const MODEL_ARTIFACT_PATH: &str = "model";

/// Everything produced by a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run: RunInfo,
    pub model: ElasticNetModel,
    pub metrics: EvalMetrics,
    pub package: ModelPackage,
    pub n_train: usize,
    pub n_test: usize,
    pub registered_version: Option<String>,
}

impl RunSummary {
    pub fn to_report(&self, settings: &ValidationResult, dataset: &Dataset) -> RunReport {
        RunReport {
            run_id: self.run.run_id.clone(),
            run_name: self.run.run_name.clone(),
            experiment_id: self.run.experiment_id.clone(),
            tracking_uri: settings.tracking_uri.to_string(),
            dataset: dataset.source.clone(),
            dataset_digest: dataset.digest.clone(),
            alpha: settings.params.alpha,
            l1_ratio: settings.params.l1_ratio,
            n_train: self.n_train,
            n_test: self.n_test,
            n_iter: self.model.n_iter,
            converged: self.model.converged,
            rmse: self.metrics.rmse,
            mae: self.metrics.mae,
            r2: self.metrics.r2,
            registered_model: self
                .registered_version
                .as_ref()
                .and(settings.registered_model_name.clone()),
            registered_version: self.registered_version.clone(),
        }
    }
}

/// Render a float the way it is echoed and logged as a param (`0.5`, `1.0`, `1e-05`)
///
/// Magnitudes below 1e-4 or from 1e16 up switch to exponent form with a signed two-digit exponent.
pub fn format_param(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (scientific.clone(), 0),
    };
    if (-4..16).contains(&exponent) {
        let decimal = value.to_string();
        if decimal.contains('.') {
            decimal
        } else {
            format!("{}.0", decimal)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Load the configured dataset, prefixing failures the way `main` reports them before exiting
pub fn load_dataset(settings: &ValidationResult) -> Result<Dataset, String> {
    settings
        .data_source
        .load(settings.separator)
        .map_err(|e| format!("❌ ERROR loading dataset: {}", e))
}

fn default_run_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("elasticnet-{}", &id[..8])
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Split, fit, score and log a model; the run is ended FAILED if any step after its creation fails
pub fn run_training(settings: &ValidationResult, dataset: &Dataset, tracker: &dyn Tracker) -> Result<RunSummary, String> {
    let (train, test) = train_test_split(dataset, &settings.split)?;
    let (train_x, train_y) = train.split_target(&settings.target)?;
    let (test_x, test_y) = test.split_target(&settings.target)?;
    println!(
        "✂️  Split: {} train rows, {} test rows, {} features (seed {})",
        train_x.n_rows(),
        test_x.n_rows(),
        train_x.n_features(),
        settings.split.seed
    );

    let experiment_id = tracker.get_or_create_experiment(&settings.experiment_name)?;
    println!("🧪 Experiment: {} (id {})", settings.experiment_name, experiment_id);

    let run_name = settings.run_name.clone().unwrap_or_else(default_run_name);
    let tags = vec![
        RunTag::new("mlflow.source.name", env!("CARGO_PKG_NAME")),
        RunTag::new("mlflow.source.type", "LOCAL"),
        RunTag::new("mlflow.user", current_user()),
        RunTag::new("dataset.source", &dataset.source),
        RunTag::new("dataset.digest", &dataset.digest),
    ];
    let run = tracker.create_run(&experiment_id, &run_name, now_millis(), &tags)?;
    println!("🏃 Started run {} ({})", run.run_name, run.run_id);

    let outcome = (|| -> Result<RunSummary, String> {
        let model = ElasticNetModel::fit(settings.params, &train_x, &train_y)?;
        println!(
            "🔧 Fitted in {} iterations, {} of {} coefficients non-zero",
            model.n_iter,
            model.n_nonzero(),
            model.coefficients.len()
        );
        let predictions = model.predict(&test_x)?;
        let metrics = eval_metrics(&test_y, &predictions)?;

        println!(
            "ElasticNet Model (alpha={}, l1_ratio={})",
            format_param(settings.params.alpha),
            format_param(settings.params.l1_ratio)
        );
        println!("RMSE: {:.4}", metrics.rmse);
        println!("MAE: {:.4}", metrics.mae);
        println!("R2: {:.4}", metrics.r2);

        let params = vec![
            Param::new("alpha", format_param(settings.params.alpha)),
            Param::new("l1_ratio", format_param(settings.params.l1_ratio)),
        ];
        let timestamp = now_millis();
        let logged_metrics: Vec<Metric> = metrics
            .as_pairs()
            .iter()
            .map(|(key, value)| Metric::new(key, *value, timestamp))
            .collect();
        tracker.log_batch(&run.run_id, &params, &logged_metrics, &[])?;

        let signature = ModelSignature::infer(&train_x);
        let package = package_model(&model, &signature, &run.run_id, MODEL_ARTIFACT_PATH)?;
        for (path, bytes) in package.artifact_files() {
            tracker.log_artifact(&run, &path, bytes)?;
        }
        tracker.log_model_metadata(&run.run_id, &package.model_json()?)?;

        let registered_version = match &settings.registered_model_name {
            Some(name) if tracker.supports_model_registry() => {
                let source = format!("{}/{}", run.artifact_uri.trim_end_matches('/'), MODEL_ARTIFACT_PATH);
                let version = tracker.register_model(name, &source, &run.run_id)?;
                println!("📦 Registered model '{}' version {}", name, version);
                Some(version)
            }
            Some(name) => {
                println!(
                    "ℹ️  {} tracker has no model registry, '{}' not registered",
                    tracker.name(),
                    name
                );
                None
            }
            None => None,
        };

        println!("✅ Model logged successfully to {}", tracker.location());
        Ok(RunSummary {
            run: run.clone(),
            model,
            metrics,
            package,
            n_train: train_y.len(),
            n_test: test_y.len(),
            registered_version,
        })
    })();

    match outcome {
        Ok(summary) => {
            tracker.end_run(&run.run_id, RunStatus::Finished, now_millis())?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(end_err) = tracker.end_run(&run.run_id, RunStatus::Failed, now_millis()) {
                eprintln!("⚠️  Failed to mark run {} as FAILED: {}", run.run_id, end_err);
            }
            Err(e)
        }
    }
}
