use std::path::Path;
use std::sync::Arc;

use log::info;
use parking_lot::RwLock;

use crate::error::{Result, SoftmaxError};
use crate::math::matrix::Matrix;
use crate::model::softmax_regression::SoftmaxRegression;
use crate::train::iteration_stats::FitReport;

/// Shared, explicitly owned model slot for services.
///
/// Any number of readers may predict at the same time. Writers
/// ([`replace`](Self::replace), [`load`](Self::load),
/// [`retrain`](Self::retrain)) build the new model first and only take the
/// write lock for the swap, so a reader sees either the old model or the new
/// one, never a model halfway through a fit. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<SoftmaxRegression>>>,
}

impl ModelHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_model(model: SoftmaxRegression) -> Self {
        ModelHandle { inner: Arc::new(RwLock::new(Some(model))) }
    }

    /// True once the slot holds a fitted or loaded model.
    pub fn is_ready(&self) -> bool {
        self.inner.read().as_ref().is_some_and(SoftmaxRegression::is_trained)
    }

    /// Swaps in `model`, returning the previous one.
    pub fn replace(&self, model: SoftmaxRegression) -> Option<SoftmaxRegression> {
        self.inner.write().replace(model)
    }

    /// Loads a model file and swaps it in. On error the slot is unchanged.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let model = SoftmaxRegression::load_json(path)?;
        self.replace(model);
        Ok(())
    }

    /// Runs `f` against the current model under a read lock.
    pub fn with_model<T>(
        &self,
        f: impl FnOnce(&SoftmaxRegression) -> Result<T>,
    ) -> Result<T> {
        let guard = self.inner.read();
        let model = guard.as_ref().ok_or(SoftmaxError::NotTrained("model handle"))?;
        f(model)
    }

    pub fn predict(&self, inputs: &Matrix) -> Result<Vec<usize>> {
        self.with_model(|m| m.predict(inputs))
    }

    pub fn predict_probabilities(&self, inputs: &Matrix) -> Result<Matrix> {
        self.with_model(|m| m.predict_probabilities(inputs))
    }

    /// Fits a copy of the current model (or `template` when the slot is
    /// empty) outside the lock, then swaps the result in.
    ///
    /// Concurrent retrains are not merged: the last one to finish wins.
    pub fn retrain(
        &self,
        template: &SoftmaxRegression,
        inputs: &Matrix,
        labels: &[usize],
    ) -> Result<FitReport> {
        let mut next = self.inner.read().clone().unwrap_or_else(|| template.clone());
        let report = next.fit(inputs, labels)?;
        self.replace(next);
        info!("model handle retrained: {} iterations", report.iterations_run);
        Ok(report)
    }

    /// Snapshot of the current model.
    pub fn snapshot(&self) -> Option<SoftmaxRegression> {
        self.inner.read().clone()
    }
}
