// merge.rs - Merge configuration file and environment with CLI arguments

use crate::cli::{Args, Config};

pub const ENV_TRACKING_URI: &str = "MLFLOW_TRACKING_URI";
pub const ENV_EXPERIMENT_NAME: &str = "MLFLOW_EXPERIMENT_NAME";
pub const ENV_TRACKING_TOKEN: &str = "MLFLOW_TRACKING_TOKEN";

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Hyperparameters (positional values are resolved later and still win)
        if self.alpha.is_none() {
            self.alpha = config.alpha;
        }
        if self.l1_ratio.is_none() {
            self.l1_ratio = config.l1_ratio;
        }
        if self.max_iter.is_none() {
            self.max_iter = config.max_iter;
        }
        if self.tol.is_none() {
            self.tol = config.tol;
        }

        // Dataset
        if self.data.is_none() {
            self.data = config.data;
        }
        if self.separator.is_none() {
            self.separator = config.separator;
        }
        if self.target.is_none() {
            self.target = config.target;
        }
        if self.test_size.is_none() {
            self.test_size = config.test_size;
        }
        if self.seed.is_none() {
            self.seed = config.seed;
        }

        // Tracking
        if self.tracking_uri.is_none() {
            self.tracking_uri = config.tracking_uri;
        }
        if self.experiment_name.is_none() {
            self.experiment_name = config.experiment_name;
        }
        if self.run_name.is_none() {
            self.run_name = config.run_name;
        }
        if self.registered_model_name.is_none() {
            self.registered_model_name = config.registered_model_name;
        }

        // Output (only override the default format, not an explicit CLI value)
        if self.report.is_none() {
            self.report = config.report;
        }
        if self.report_format == "json" {
            if let Some(format) = config.report_format {
                self.report_format = format;
            }
        }
        if self.save_model.is_none() {
            self.save_model = config.save_model;
        }

        // Flags (only if not set via CLI)
        if !self.no_register && config.no_register.unwrap_or(false) {
            self.no_register = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration from file and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }

    /// Fill tracking settings still unset from MLflow environment variables
    pub fn merge_with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.tracking_uri.is_none() {
            self.tracking_uri = non_empty(lookup(ENV_TRACKING_URI));
        }
        if self.experiment_name.is_none() {
            self.experiment_name = non_empty(lookup(ENV_EXPERIMENT_NAME));
        }
        self
    }
}

/// Bearer token for tracking servers, if one is configured
pub fn tracking_token<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(ENV_TRACKING_TOKEN))
}

/// Process environment lookup
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_cli_wins_over_config() {
        let mut args = Args::empty();
        args.alpha = Some(0.1);
        args.report_format = "csv".to_string();

        let mut config = Config::new();
        config.alpha = Some(0.9);
        config.l1_ratio = Some(0.2);
        config.report_format = Some("tsv".to_string());
        config.dry_run = Some(true);

        let merged = args.merge_with_config(config);
        assert_eq!(merged.alpha, Some(0.1));
        assert_eq!(merged.l1_ratio, Some(0.2));
        assert_eq!(merged.report_format, "csv");
        assert!(merged.dry_run);
    }

    #[test]
    fn test_positional_beats_config_alpha() {
        let mut args = Args::empty();
        args.hyperparams = vec![0.3];

        let mut config = Config::new();
        config.alpha = Some(0.9);
        config.l1_ratio = Some(0.7);

        let merged = args.merge_with_config(config);
        assert_eq!(merged.effective_alpha(), Some(0.3));
        assert_eq!(merged.effective_l1_ratio(), Some(0.7));
    }

    #[test]
    fn test_config_format_replaces_default() {
        let mut config = Config::new();
        config.report_format = Some("tsv".to_string());
        assert_eq!(Args::empty().merge_with_config(config).report_format, "tsv");
    }

    #[test]
    fn test_env_fills_only_missing_values() {
        let lookup = env(&[
            (ENV_TRACKING_URI, "http://tracking:5000"),
            (ENV_EXPERIMENT_NAME, "wine"),
        ]);

        let merged = Args::empty().merge_with_env(&lookup);
        assert_eq!(merged.tracking_uri.as_deref(), Some("http://tracking:5000"));
        assert_eq!(merged.experiment_name.as_deref(), Some("wine"));

        let mut args = Args::empty();
        args.tracking_uri = Some("./local".to_string());
        let merged = args.merge_with_env(&lookup);
        assert_eq!(merged.tracking_uri.as_deref(), Some("./local"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let lookup = env(&[(ENV_TRACKING_URI, "  "), (ENV_TRACKING_TOKEN, "")]);
        assert_eq!(Args::empty().merge_with_env(&lookup).tracking_uri, None);
        assert_eq!(tracking_token(&lookup), None);
        assert_eq!(tracking_token(env(&[(ENV_TRACKING_TOKEN, "secret")])), Some("secret".to_string()));
    }

    #[test]
    fn test_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wine-enet.toml");
        std::fs::write(&path, "seed = 7\nexperiment_name = \"wine\"\n").unwrap();

        let merged = Args::empty().with_config_file(path.to_str().unwrap()).unwrap();
        assert_eq!(merged.seed, Some(7));
        assert_eq!(merged.experiment_name.as_deref(), Some("wine"));

        let missing = dir.path().join("absent.toml");
        assert!(Args::empty().with_config_file(missing.to_str().unwrap()).is_err());
    }
}
