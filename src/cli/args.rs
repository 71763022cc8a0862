// args.rs - Command line arguments definition

use argh::FromArgs;

/// Default dataset: red wine quality, semicolon separated
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/mlflow/mlflow/master/tests/datasets/winequality-red.csv";

#[derive(FromArgs, Debug, Clone, PartialEq)]
/// wine-enet - Train an ElasticNet model on the wine-quality dataset and track it in MLflow
pub struct Args {
    /// hyperparameters in order: alpha, then l1_ratio (both default to 0.5)
    #[argh(positional)]
    pub hyperparams: Vec<f64>,

    /// penalty strength; overridden by the first positional value
    #[argh(option)]
    pub alpha: Option<f64>,

    /// mix between L1 and L2 penalty, 0.0-1.0; overridden by the second positional value
    #[argh(option)]
    pub l1_ratio: Option<f64>,

    /// dataset URL or local path (default: red wine-quality CSV)
    #[argh(option)]
    pub data: Option<String>,

    /// field separator of the dataset (default: ;)
    #[argh(option)]
    pub separator: Option<String>,

    /// target column (default: quality)
    #[argh(option)]
    pub target: Option<String>,

    /// fraction of rows held out for evaluation (default: 0.25)
    #[argh(option)]
    pub test_size: Option<f64>,

    /// seed of the train/test shuffle (default: 42)
    #[argh(option)]
    pub seed: Option<u64>,

    /// maximum coordinate descent sweeps (default: 1000)
    #[argh(option)]
    pub max_iter: Option<usize>,

    /// convergence tolerance (default: 0.0001)
    #[argh(option)]
    pub tol: Option<f64>,

    /// tracking URI: local path, file:, http:// or https:// (default: $MLFLOW_TRACKING_URI or ./mlruns)
    #[argh(option)]
    pub tracking_uri: Option<String>,

    /// experiment name (default: $MLFLOW_EXPERIMENT_NAME or Default)
    #[argh(option)]
    pub experiment_name: Option<String>,

    /// run name (default: generated)
    #[argh(option)]
    pub run_name: Option<String>,

    /// name under which the model is registered (default: ElasticnetWineModel)
    #[argh(option)]
    pub registered_model_name: Option<String>,

    /// log the model without registering it
    #[argh(switch)]
    pub no_register: bool,

    /// write a run report to this file
    #[argh(option)]
    pub report: Option<String>,

    /// report format: json, tsv, csv (default: json)
    #[argh(option, default = "String::from(\"json\")")]
    pub report_format: String,

    /// also save the packaged model to this local directory
    #[argh(option)]
    pub save_model: Option<String>,

    /// load and split the dataset, then exit without training
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

impl Args {
    /// Arguments with nothing set, as if invoked without flags
    pub fn empty() -> Self {
        Self {
            hyperparams: Vec::new(),
            alpha: None,
            l1_ratio: None,
            data: None,
            separator: None,
            target: None,
            test_size: None,
            seed: None,
            max_iter: None,
            tol: None,
            tracking_uri: None,
            experiment_name: None,
            run_name: None,
            registered_model_name: None,
            no_register: false,
            report: None,
            report_format: "json".to_string(),
            save_model: None,
            dry_run: false,
            config: None,
            generate_config: false,
        }
    }

    /// Alpha after applying the positional override
    pub fn effective_alpha(&self) -> Option<f64> {
        self.hyperparams.first().copied().or(self.alpha)
    }

    /// l1_ratio after applying the positional override
    pub fn effective_l1_ratio(&self) -> Option<f64> {
        self.hyperparams.get(1).copied().or(self.l1_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_hyperparameters() {
        let args = Args::from_args(&["wine-enet"], &["0.3", "0.9"]).unwrap();
        assert_eq!(args.effective_alpha(), Some(0.3));
        assert_eq!(args.effective_l1_ratio(), Some(0.9));

        let args = Args::from_args(&["wine-enet"], &["0.3"]).unwrap();
        assert_eq!(args.effective_alpha(), Some(0.3));
        assert_eq!(args.effective_l1_ratio(), None);

        let args = Args::from_args(&["wine-enet"], &["--l1-ratio", "0.2", "0.3"]).unwrap();
        assert_eq!(args.effective_alpha(), Some(0.3));
        assert_eq!(args.effective_l1_ratio(), Some(0.2));

        let args = Args::from_args(&["wine-enet"], &[]).unwrap();
        assert_eq!(args, Args::empty());
    }

    #[test]
    fn test_options_and_switches() {
        let args = Args::from_args(
            &["wine-enet"],
            &["--tracking-uri", "http://localhost:5000", "--no-register", "--seed", "7", "0.1"],
        )
        .unwrap();
        assert_eq!(args.tracking_uri.as_deref(), Some("http://localhost:5000"));
        assert!(args.no_register);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.effective_alpha(), Some(0.1));
    }

    #[test]
    fn test_non_numeric_alpha_is_rejected() {
        assert!(Args::from_args(&["wine-enet"], &["abc"]).is_err());
    }
}
