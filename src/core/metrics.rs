// metrics.rs - Regression evaluation metrics on linfa

use linfa::prelude::SingleTargetRegression;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Test-set scores of a fitted regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl EvalMetrics {
    /// Metric names and values in logging order
    pub fn as_pairs(&self) -> [(&'static str, f64); 3] {
        [("rmse", self.rmse), ("mae", self.mae), ("r2", self.r2)]
    }
}

fn check_inputs(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<(), String> {
    if actual.is_empty() {
        return Err("Cannot score an empty prediction set".to_string());
    }
    if actual.len() != predicted.len() {
        return Err(format!(
            "Length mismatch: {} actual values vs {} predictions",
            actual.len(),
            predicted.len()
        ));
    }
    Ok(())
}

/// Coefficient of determination
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<f64, String> {
    check_inputs(actual, predicted)?;
    let mean = actual.mean().unwrap_or(0.0);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        let exact = actual.iter().zip(predicted.iter()).all(|(a, p)| a == p);
        return Ok(if exact { 1.0 } else { 0.0 });
    }
    predicted.r2(actual).map_err(|e| format!("Failed to compute R2: {}", e))
}

/// RMSE, MAE and R² of a prediction set
pub fn eval_metrics(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<EvalMetrics, String> {
    check_inputs(actual, predicted)?;
    let mse = predicted
        .mean_squared_error(actual)
        .map_err(|e| format!("Failed to compute MSE: {}", e))?;
    let mae = predicted
        .mean_absolute_error(actual)
        .map_err(|e| format!("Failed to compute MAE: {}", e))?;
    Ok(EvalMetrics {
        rmse: mse.sqrt(),
        mae,
        r2: r2_score(actual, predicted)?,
    })
}
