// model.rs - MLmodel packaging of fitted models

use crate::core::{ElasticNetModel, ModelSignature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::path::Path;

/// Flavor name written into MLmodel files
pub const FLAVOR_NAME: &str = "wine_enet";
const MODEL_DATA_FILE: &str = "model.json";
const MLMODEL_FILE: &str = "MLmodel";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorSpec {
    pub data: String,
    pub model_format: String,
    pub crate_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSpec {
    pub inputs: String,
    pub outputs: String,
    pub params: Option<String>,
}

/// Contents of an MLmodel descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlModel {
    pub artifact_path: String,
    pub flavors: BTreeMap<String, FlavorSpec>,
    pub model_uuid: String,
    pub run_id: String,
    pub utc_time_created: String,
    pub signature: Option<SignatureSpec>,
}

/// Files making up a logged model, relative to its artifact path
#[derive(Debug, Clone)]
pub struct ModelPackage {
    pub artifact_path: String,
    pub mlmodel: MlModel,
    pub files: Vec<(String, Vec<u8>)>,
}

/// Build the MLmodel descriptor and serialized model for a run
pub fn package_model(
    model: &ElasticNetModel,
    signature: &ModelSignature,
    run_id: &str,
    artifact_path: &str,
) -> Result<ModelPackage, String> {
    let (inputs, outputs) = signature.to_json_strings()?;

    let mut flavors = BTreeMap::new();
    flavors.insert(
        FLAVOR_NAME.to_string(),
        FlavorSpec {
            data: MODEL_DATA_FILE.to_string(),
            model_format: "json".to_string(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    );

    let mlmodel = MlModel {
        artifact_path: artifact_path.to_string(),
        flavors,
        model_uuid: uuid::Uuid::new_v4().simple().to_string(),
        run_id: run_id.to_string(),
        utc_time_created: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        signature: Some(SignatureSpec {
            inputs,
            outputs,
            params: None,
        }),
    };

    let descriptor = serde_yaml::to_string(&mlmodel).map_err(|e| format!("Failed to serialize MLmodel: {}", e))?;
    let files = vec![
        (MLMODEL_FILE.to_string(), descriptor.into_bytes()),
        (MODEL_DATA_FILE.to_string(), model.to_json()?.into_bytes()),
    ];

    Ok(ModelPackage {
        artifact_path: artifact_path.to_string(),
        mlmodel,
        files,
    })
}

impl ModelPackage {
    /// MLmodel descriptor as JSON, the form the tracking server's model history expects
    pub fn model_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.mlmodel).map_err(|e| format!("Failed to serialize model metadata: {}", e))
    }

    /// (artifact path, bytes) for every file in the package
    pub fn artifact_files(&self) -> impl Iterator<Item = (String, &[u8])> + '_ {
        self.files
            .iter()
            .map(move |(name, bytes)| (format!("{}/{}", self.artifact_path, name), bytes.as_slice()))
    }

    /// Write the package into a local directory
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), String> {
        create_dir_all(dir).map_err(|e| format!("Failed to create model directory '{}': {}", dir.display(), e))?;
        for (name, bytes) in &self.files {
            let path = dir.join(name);
            fs::write(&path, bytes).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        }
        println!("💾 Model saved to: {}", dir.display());
        Ok(())
    }
}

/// Load a model previously written by `save_to_dir` (or downloaded from a run)
pub fn load_model_dir(dir: &Path) -> Result<ElasticNetModel, String> {
    let descriptor_path = dir.join(MLMODEL_FILE);
    let content = fs::read_to_string(&descriptor_path)
        .map_err(|e| format!("Failed to read '{}': {}", descriptor_path.display(), e))?;
    let mlmodel: MlModel =
        serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse '{}': {}", descriptor_path.display(), e))?;

    let flavor = mlmodel
        .flavors
        .get(FLAVOR_NAME)
        .ok_or_else(|| format!("MLmodel in '{}' has no '{}' flavor", dir.display(), FLAVOR_NAME))?;
    ElasticNetModel::load(&dir.join(&flavor.data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ElasticNetParams;
    use crate::data::FeatureMatrix;

    fn fitted() -> (ElasticNetModel, FeatureMatrix) {
        let x = FeatureMatrix::from_rows(
            vec!["alcohol".into(), "pH".into()],
            &[vec![9.4, 3.5], vec![9.8, 3.2], vec![10.5, 3.3], vec![11.0, 3.1]],
        )
        .unwrap();
        let model =
            ElasticNetModel::fit(ElasticNetParams::new(0.01, 0.5), &x, &ndarray::array![5.0, 5.0, 6.0, 7.0]).unwrap();
        (model, x)
    }

    #[test]
    fn test_package_contents() {
        let (model, x) = fitted();
        let package = package_model(&model, &ModelSignature::infer(&x), "run123", "model").unwrap();

        let paths: Vec<String> = package.artifact_files().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["model/MLmodel".to_string(), "model/model.json".to_string()]);

        let descriptor = String::from_utf8(package.files[0].1.clone()).unwrap();
        assert!(descriptor.contains("artifact_path: model"));
        assert!(descriptor.contains("run_id: run123"));
        assert!(descriptor.contains(FLAVOR_NAME));

        let json: serde_json::Value = serde_json::from_str(&package.model_json().unwrap()).unwrap();
        assert_eq!(json["run_id"], "run123");
        assert!(json["signature"]["inputs"].as_str().unwrap().contains("alcohol"));
    }

    #[test]
    fn test_save_and_reload() {
        let (model, x) = fitted();
        let package = package_model(&model, &ModelSignature::infer(&x), "run123", "model").unwrap();
        let dir = tempfile::tempdir().unwrap();
        package.save_to_dir(&dir.path().join("model")).unwrap();

        let restored = load_model_dir(&dir.path().join("model")).unwrap();
        assert_eq!(restored.feature_names, model.feature_names);
        assert_eq!(restored.coefficients.len(), 2);
        assert!((restored.intercept - model.intercept).abs() < 1e-12);
    }

    #[test]
    fn test_reload_without_flavor_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MLMODEL_FILE), "artifact_path: model\nflavors: {}\nmodel_uuid: abc\nrun_id: run123\nutc_time_created: now\n").unwrap();
        let err = load_model_dir(dir.path()).unwrap_err();
        assert!(err.contains(FLAVOR_NAME), "{}", err);
    }
}
