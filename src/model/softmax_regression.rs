use crate::activation::softmax::softmax_rows;
use crate::config::Hyperparams;
use crate::error::{Result, SoftmaxError};
use crate::eval::metrics;
use crate::math::matrix::Matrix;
use crate::train::fit_config::FitConfig;
use crate::train::iteration_stats::FitReport;
use crate::train::loop_fn::fit_loop;

/// Standard deviation of the initial weights. Only breaks symmetry.
pub const INIT_STD_DEV: f64 = 0.01;

/// Fitted parameters. Weights are `(n_features, n_classes)`, bias has one
/// entry per class.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub weights: Matrix,
    pub bias: Vec<f64>,
}

/// Multinomial logistic regression trained with full-batch gradient descent.
///
/// A new model carries hyperparameters only. The first successful
/// [`fit`](Self::fit) allocates small random weights and zero bias; later
/// fits continue from the existing parameters, and must therefore see the
/// same feature count and the same derived class count.
///
/// The class count is never declared: it is `max(label) + 1` over the
/// training labels, so labels should be dense integers starting at 0.
///
/// `fit` mutates the model and needs exclusive access. Prediction takes
/// `&self`, so many readers may share a model that is not being refit (see
/// [`ModelHandle`](crate::model::handle::ModelHandle)).
#[derive(Debug, Clone)]
pub struct SoftmaxRegression {
    pub(crate) params: Option<Parameters>,
    pub(crate) hyperparams: Hyperparams,
    pub(crate) loss_history: Vec<f64>,
    pub(crate) seed: Option<u64>,
}

impl SoftmaxRegression {
    /// Creates an untrained model. Hyperparameters are not validated; use
    /// [`from_hyperparams_checked`](Self::from_hyperparams_checked) for that.
    pub fn new(learning_rate: f64, iterations: usize, regularization: f64) -> Self {
        Self::from_hyperparams(Hyperparams::new(learning_rate, iterations, regularization))
    }

    pub fn from_hyperparams(hyperparams: Hyperparams) -> Self {
        SoftmaxRegression {
            params: None,
            hyperparams,
            loss_history: Vec::new(),
            seed: None,
        }
    }

    pub fn from_hyperparams_checked(hyperparams: Hyperparams) -> Result<Self> {
        hyperparams.validate()?;
        Ok(Self::from_hyperparams(hyperparams))
    }

    /// Rebuilds a trained model from stored parameters.
    pub(crate) fn from_parts(params: Parameters, hyperparams: Hyperparams) -> Self {
        SoftmaxRegression {
            params: Some(params),
            hyperparams,
            loss_history: Vec::new(),
            seed: None,
        }
    }

    /// Makes weight initialisation deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn hyperparams(&self) -> &Hyperparams {
        &self.hyperparams
    }

    pub fn learning_rate(&self) -> f64 {
        self.hyperparams.learning_rate
    }

    pub fn iterations(&self) -> usize {
        self.hyperparams.iterations
    }

    pub fn regularization(&self) -> f64 {
        self.hyperparams.regularization
    }

    pub fn weights(&self) -> Option<&Matrix> {
        self.params.as_ref().map(|p| &p.weights)
    }

    pub fn bias(&self) -> Option<&[f64]> {
        self.params.as_ref().map(|p| p.bias.as_slice())
    }

    /// Loss per iteration of the most recent fit. Empty on a loaded model.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    pub fn is_trained(&self) -> bool {
        self.params.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.weights().map(Matrix::rows)
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.weights().map(Matrix::cols)
    }

    /// Fits on `inputs` `(n_samples, n_features)` with one label per row,
    /// running exactly `iterations` gradient-descent steps.
    pub fn fit(&mut self, inputs: &Matrix, labels: &[usize]) -> Result<FitReport> {
        fit_loop(self, inputs, labels, &FitConfig::default())
    }

    /// Like [`fit`](Self::fit), with a stop flag and/or progress channel.
    pub fn fit_with(
        &mut self,
        inputs: &Matrix,
        labels: &[usize],
        config: &FitConfig,
    ) -> Result<FitReport> {
        fit_loop(self, inputs, labels, config)
    }

    fn trained(&self, op: &'static str) -> Result<&Parameters> {
        self.params.as_ref().ok_or(SoftmaxError::NotTrained(op))
    }

    /// Class probabilities `(n_samples, n_classes)`; every row sums to 1.
    pub fn predict_probabilities(&self, inputs: &Matrix) -> Result<Matrix> {
        let params = self.trained("predict_probabilities")?;
        if inputs.cols() != params.weights.rows() {
            return Err(SoftmaxError::shape(format!(
                "input has {} features, model expects {}",
                inputs.cols(),
                params.weights.rows()
            )));
        }
        let (_, probabilities) = forward(params, inputs);
        Ok(probabilities)
    }

    /// Most probable class per row; ties go to the lowest index.
    pub fn predict(&self, inputs: &Matrix) -> Result<Vec<usize>> {
        let probabilities = self.predict_probabilities(inputs)?;
        Ok(probabilities.iter_rows().map(metrics::argmax).collect())
    }

    /// Fraction of rows whose prediction equals the label.
    pub fn accuracy(&self, inputs: &Matrix, labels: &[usize]) -> Result<f64> {
        let predictions = self.predict(inputs)?;
        metrics::accuracy(&predictions, labels)
    }
}

/// Linear scores `X·W + b` and their row-wise softmax.
///
/// Shapes are checked by the callers; a mismatch here is a bug.
pub(crate) fn forward(params: &Parameters, inputs: &Matrix) -> (Matrix, Matrix) {
    let mut scores = inputs * &params.weights;
    scores.add_row_broadcast(&params.bias);
    let probabilities = softmax_rows(&scores);
    (scores, probabilities)
}
