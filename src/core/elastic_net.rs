// elastic_net.rs - ElasticNet regression through linfa-elasticnet

use crate::data::FeatureMatrix;
use linfa::traits::Fit;
use linfa::Dataset as LinfaDataset;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters of an ElasticNet fit
///
/// The minimised objective is
/// `1/(2n) ||y - Xw - b||² + alpha * l1_ratio * ||w||₁ + 0.5 * alpha * (1 - l1_ratio) * ||w||²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
}

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            l1_ratio: 0.5,
            max_iter: 1000,
            tol: 1e-4,
            fit_intercept: true,
        }
    }
}

impl ElasticNetParams {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(format!("alpha must be a finite value >= 0, got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(format!("l1_ratio must be between 0.0 and 1.0, got {}", self.l1_ratio));
        }
        if self.max_iter == 0 {
            return Err("max_iter must be at least 1".to_string());
        }
        if self.max_iter > u32::MAX as usize {
            return Err(format!("max_iter must be at most {}, got {}", u32::MAX, self.max_iter));
        }
        if !(self.tol > 0.0) {
            return Err(format!("tol must be > 0, got {}", self.tol));
        }
        Ok(())
    }
}

/// A fitted ElasticNet model: the coefficients and intercept linfa produced, plus fit diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetModel {
    pub params: ElasticNetParams,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Coordinate descent sweeps performed
    pub n_iter: usize,
    pub dual_gap: f64,
    pub converged: bool,
}

impl ElasticNetModel {
    /// Fit on a feature matrix and its target vector
    pub fn fit(params: ElasticNetParams, x: &FeatureMatrix, y: &Array1<f64>) -> Result<Self, String> {
        params.validate()?;

        let n = x.n_rows();
        if n == 0 {
            return Err("Cannot fit on an empty training set".to_string());
        }
        if y.len() != n {
            return Err(format!("Feature rows ({}) and target length ({}) differ", n, y.len()));
        }
        if x.records.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err("Input contains NaN or infinity".to_string());
        }

        let dataset = LinfaDataset::new(x.records.clone(), y.clone()).with_feature_names(x.names.clone());
        let fitted = ElasticNet::params()
            .penalty(params.alpha)
            .l1_ratio(params.l1_ratio)
            .with_intercept(params.fit_intercept)
            .max_iterations(params.max_iter as u32)
            .tolerance(params.tol)
            .fit(&dataset)
            .map_err(|e| format!("ElasticNet fit failed: {}", e))?;

        // Stopping rule of the solver: duality gap within tol * ||y - mean(y)||²
        let y_mean = if params.fit_intercept { y.mean().unwrap_or(0.0) } else { 0.0 };
        let gap_tol = params.tol * y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>();
        let dual_gap = fitted.duality_gap();
        let converged = dual_gap <= gap_tol;
        let n_iter = fitted.n_steps() as usize;

        if !converged {
            println!(
                "⚠️  ElasticNet did not converge after {} iterations (duality gap {:.3e}, tolerance {:.3e})",
                n_iter, dual_gap, gap_tol
            );
        }

        Ok(Self {
            params,
            feature_names: x.names.clone(),
            coefficients: fitted.hyperplane().to_vec(),
            intercept: fitted.intercept(),
            n_iter,
            dual_gap,
            converged,
        })
    }

    /// Predict one value per feature row
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Array1<f64>, String> {
        if x.n_features() != self.coefficients.len() {
            return Err(format!(
                "Model expects {} features, got {}",
                self.coefficients.len(),
                x.n_features()
            ));
        }
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        Ok(x.records.dot(&coefficients) + self.intercept)
    }

    /// Number of non-zero coefficients
    pub fn n_nonzero(&self) -> usize {
        self.coefficients.iter().filter(|c| **c != 0.0).count()
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize model: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse model JSON: {}", e))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read model file '{}': {}", path.display(), e))?;
        Self::from_json(&content)
    }
}
