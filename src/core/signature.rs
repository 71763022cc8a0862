// signature.rs - Model input/output schema in MLflow's signature format

use crate::data::FeatureMatrix;
use serde::{Deserialize, Serialize};

/// One named input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub dtype: String,
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub dtype: String,
    pub shape: Vec<i64>,
}

/// Unnamed tensor output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "tensor-spec")]
    pub tensor_spec: TensorInfo,
}

/// Inputs are a column schema, outputs a 1-D float64 tensor
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSignature {
    pub inputs: Vec<ColumnSpec>,
    pub outputs: Vec<TensorSpec>,
}

impl ModelSignature {
    /// Derive the signature from the training features; predictions are always a float64 vector
    pub fn infer(features: &FeatureMatrix) -> Self {
        let inputs = features
            .names
            .iter()
            .map(|name| ColumnSpec {
                dtype: "double".to_string(),
                name: name.clone(),
                required: true,
            })
            .collect();

        let outputs = vec![TensorSpec {
            kind: "tensor".to_string(),
            tensor_spec: TensorInfo {
                dtype: "float64".to_string(),
                shape: vec![-1],
            },
        }];

        Self { inputs, outputs }
    }

    /// JSON strings as stored under `signature:` in an MLmodel file
    pub fn to_json_strings(&self) -> Result<(String, String), String> {
        let inputs = serde_json::to_string(&self.inputs)
            .map_err(|e| format!("Failed to serialize signature inputs: {}", e))?;
        let outputs = serde_json::to_string(&self.outputs)
            .map_err(|e| format!("Failed to serialize signature outputs: {}", e))?;
        Ok((inputs, outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_signature() {
        let features =
            FeatureMatrix::from_rows(vec!["fixed acidity".into(), "alcohol".into()], &[vec![7.4, 9.4]]).unwrap();
        let signature = ModelSignature::infer(&features);
        assert_eq!(signature.inputs.len(), 2);
        assert_eq!(signature.inputs[0].name, "fixed acidity");

        let (inputs, outputs) = signature.to_json_strings().unwrap();
        assert_eq!(
            inputs,
            r#"[{"type":"double","name":"fixed acidity","required":true},{"type":"double","name":"alcohol","required":true}]"#
        );
        assert_eq!(outputs, r#"[{"type":"tensor","tensor-spec":{"dtype":"float64","shape":[-1]}}]"#);
    }
}
