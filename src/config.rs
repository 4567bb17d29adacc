use serde::{Serialize, Deserialize};

use crate::error::{Result, SoftmaxError};

/// Training hyperparameters.
///
/// Missing fields in a JSON config fall back to [`Hyperparams::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    pub learning_rate: f64,
    /// Exact number of gradient-descent steps per fit.
    pub iterations: usize,
    /// L2 coefficient on the weights; `0.0` disables the penalty.
    pub regularization: f64,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams { learning_rate: 0.1, iterations: 3000, regularization: 1e-3 }
    }
}

impl Hyperparams {
    pub fn new(learning_rate: f64, iterations: usize, regularization: f64) -> Self {
        Hyperparams { learning_rate, iterations, regularization }
    }

    /// Rejects values that can never produce a useful fit.
    ///
    /// The model itself accepts any values; this is for callers that want to
    /// fail fast on bad user input.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SoftmaxError::InvalidConfig(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        if self.iterations == 0 {
            return Err(SoftmaxError::InvalidConfig("iterations must be at least 1".into()));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(SoftmaxError::InvalidConfig(format!(
                "regularization must be a non-negative finite number, got {}",
                self.regularization
            )));
        }
        Ok(())
    }

    /// Serializes the hyperparameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes hyperparameters from a JSON file.
    pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<Hyperparams> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
