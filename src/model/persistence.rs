//! On-disk model format.
//!
//! A trained [`SoftmaxRegression`] is stored as a pretty-printed JSON record
//! with named fields. The record is a separate type from the model so the
//! file layout stays stable if the in-memory representation changes, and it
//! is fully validated on load: a truncated or hand-edited file is reported
//! as a [`SoftmaxError::Format`] instead of producing a broken model.
//!
//! Loss history is not stored; a loaded model starts with an empty history.

use std::io::Write;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Hyperparams;
use crate::error::{Result, SoftmaxError};
use crate::math::matrix::Matrix;
use crate::model::softmax_regression::{Parameters, SoftmaxRegression};

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Where the command line tool reads and writes models by default.
pub const DEFAULT_MODEL_PATH: &str = "weights/softmax_model.json";

fn default_format_version() -> u32 {
    MODEL_FORMAT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Absent in files written before versioning; read as version 1.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(alias = "n_features")]
    pub feature_count: usize,
    #[serde(alias = "n_classes")]
    pub class_count: usize,
    /// Row-major `(feature_count, class_count)`.
    #[serde(alias = "w")]
    pub weights: Vec<f64>,
    #[serde(alias = "b")]
    pub bias: Vec<f64>,
    #[serde(alias = "lr")]
    pub learning_rate: f64,
    #[serde(alias = "n_iter")]
    pub iterations: usize,
    #[serde(alias = "reg_lambda")]
    pub regularization_strength: f64,
}

impl ModelFile {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(SoftmaxError::format(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.feature_count == 0 || self.class_count == 0 {
            return Err(SoftmaxError::format(format!(
                "feature_count and class_count must be > 0, got {} and {}",
                self.feature_count, self.class_count
            )));
        }

        let expected_w = self.feature_count
            .checked_mul(self.class_count)
            .ok_or_else(|| SoftmaxError::format("weight shape overflow"))?;
        if self.weights.len() != expected_w {
            return Err(SoftmaxError::format(format!(
                "weights length {} does not match feature_count * class_count ({} * {})",
                self.weights.len(),
                self.feature_count,
                self.class_count
            )));
        }
        if self.bias.len() != self.class_count {
            return Err(SoftmaxError::format(format!(
                "bias length {} does not match class_count {}",
                self.bias.len(),
                self.class_count
            )));
        }

        if self.weights.iter().chain(&self.bias).any(|v| !v.is_finite()) {
            return Err(SoftmaxError::format("parameters must contain only finite values"));
        }

        Ok(())
    }
}

impl TryFrom<&SoftmaxRegression> for ModelFile {
    type Error = SoftmaxError;

    fn try_from(model: &SoftmaxRegression) -> Result<Self> {
        let params = model.params.as_ref().ok_or(SoftmaxError::NotTrained("save"))?;
        let hp = model.hyperparams();
        let file = ModelFile {
            format_version: MODEL_FORMAT_VERSION,
            feature_count: params.weights.rows(),
            class_count: params.weights.cols(),
            weights: params.weights.to_flat(),
            bias: params.bias.clone(),
            learning_rate: hp.learning_rate,
            iterations: hp.iterations,
            regularization_strength: hp.regularization,
        };
        // A diverged fit would serialize non-finite values as `null`.
        file.validate()?;
        Ok(file)
    }
}

impl TryFrom<ModelFile> for SoftmaxRegression {
    type Error = SoftmaxError;

    fn try_from(file: ModelFile) -> Result<Self> {
        file.validate()?;
        let weights = Matrix::from_flat(file.feature_count, file.class_count, &file.weights)?;
        let hyperparams = Hyperparams::new(
            file.learning_rate,
            file.iterations,
            file.regularization_strength,
        );
        Ok(SoftmaxRegression::from_parts(
            Parameters { weights, bias: file.bias },
            hyperparams,
        ))
    }
}

impl SoftmaxRegression {
    /// Serializes the trained model to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let file = ModelFile::try_from(self)?;
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parses and validates a model from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(s)
            .map_err(|e| SoftmaxError::format(format!("failed to parse model json: {e}")))?;
        file.try_into()
    }

    /// Writes the model to `path`, replacing any existing file atomically.
    ///
    /// The JSON is written to a temporary file in the same directory, flushed
    /// and then renamed over `path`, so readers never see a partial file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SoftmaxError::Io(e.error))?;

        info!("saved softmax model to {}", path.display());
        Ok(())
    }

    /// Loads a model previously written by [`save_json`](Self::save_json).
    ///
    /// The returned model is independent of whatever wrote the file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model = Self::from_json_str(&text)?;
        info!(
            "loaded softmax model from {} ({} features, {} classes)",
            path.display(),
            model.n_features().unwrap_or(0),
            model.n_classes().unwrap_or(0)
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained() -> SoftmaxRegression {
        let x = Matrix::from_rows(vec![
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ]).unwrap();
        let mut model = SoftmaxRegression::new(0.2, 30, 0.01);
        model.fit(&x, &[0, 1, 1]).unwrap();
        model
    }

    #[test]
    fn save_requires_training() {
        let model = SoftmaxRegression::new(0.1, 10, 0.0);
        assert!(matches!(model.to_json_string(), Err(SoftmaxError::NotTrained("save"))));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        assert!(model.save_json(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn diverged_model_is_not_saved() {
        let weights = Matrix::from_flat(2, 2, &[f64::NAN, 1.0, f64::INFINITY, 0.0]).unwrap();
        let model = SoftmaxRegression::from_parts(
            Parameters { weights, bias: vec![0.0, 0.0] },
            Hyperparams::new(10.0, 2000, 1.0),
        );
        assert!(matches!(model.to_json_string(), Err(SoftmaxError::Format(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        assert!(model.save_json(&path).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn short_field_names_are_accepted() {
        let json = r#"{
            "n_features": 2, "n_classes": 2,
            "w": [0.5, -0.5, 0.25, 0.0], "b": [0.0, 0.1],
            "lr": 0.1, "n_iter": 2000, "reg_lambda": 0.001
        }"#;
        let model = SoftmaxRegression::from_json_str(json).unwrap();
        assert_eq!(model.n_features(), Some(2));
        assert_eq!(model.bias(), Some(&[0.0, 0.1][..]));
        assert_eq!(model.hyperparams(), &Hyperparams::new(0.1, 2000, 0.001));
    }

    #[test]
    fn json_uses_named_fields() {
        let json = trained().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["feature_count"], 3);
        assert_eq!(value["class_count"], 2);
        assert_eq!(value["weights"].as_array().unwrap().len(), 6);
        assert_eq!(value["iterations"], 30);
    }

    #[test]
    fn string_roundtrip_is_exact() {
        let model = trained();
        let loaded = SoftmaxRegression::from_json_str(&model.to_json_string().unwrap()).unwrap();
        assert_eq!(loaded.weights(), model.weights());
        assert_eq!(loaded.bias(), model.bias());
        assert_eq!(loaded.hyperparams(), model.hyperparams());
        assert!(loaded.loss_history().is_empty());
    }

    #[test]
    fn missing_version_reads_as_v1() {
        let json = r#"{
            "feature_count": 1, "class_count": 2,
            "weights": [0.5, -0.5], "bias": [0.0, 0.1],
            "learning_rate": 0.1, "iterations": 10, "regularization_strength": 0.0
        }"#;
        let model = SoftmaxRegression::from_json_str(json).unwrap();
        assert_eq!(model.n_classes(), Some(2));
    }

    #[test]
    fn rejects_unknown_version() {
        let json = r#"{
            "format_version": 999, "feature_count": 1, "class_count": 1,
            "weights": [0.5], "bias": [0.0],
            "learning_rate": 0.1, "iterations": 10, "regularization_strength": 0.0
        }"#;
        let err = SoftmaxRegression::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("format_version"));
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let bad_weights = r#"{
            "feature_count": 2, "class_count": 2,
            "weights": [0.5, -0.5, 1.0], "bias": [0.0, 0.1],
            "learning_rate": 0.1, "iterations": 10, "regularization_strength": 0.0
        }"#;
        let err = SoftmaxRegression::from_json_str(bad_weights).unwrap_err();
        assert!(matches!(err, SoftmaxError::Format(ref m) if m.contains("weights length")));

        let bad_bias = r#"{
            "feature_count": 1, "class_count": 2,
            "weights": [0.5, -0.5], "bias": [0.0],
            "learning_rate": 0.1, "iterations": 10, "regularization_strength": 0.0
        }"#;
        let err = SoftmaxRegression::from_json_str(bad_bias).unwrap_err().to_string();
        assert!(err.contains("bias length"));
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let json = trained().to_json_string().unwrap();
        std::fs::write(&path, &json[..json.len() / 2]).unwrap();
        assert!(matches!(SoftmaxRegression::load_json(&path), Err(SoftmaxError::Format(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SoftmaxRegression::load_json(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SoftmaxError::Io(_)));
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "garbage").unwrap();
        let model = trained();
        model.save_json(&path).unwrap();
        let loaded = SoftmaxRegression::load_json(&path).unwrap();
        assert_eq!(loaded.weights(), model.weights());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
