use crate::math::matrix::Matrix;

/// Categorical cross-entropy over softmax probabilities, with an optional
/// L2 penalty on the weight matrix.
pub struct CrossEntropyLoss;

/// Probabilities are clamped to this floor before `ln` to avoid `-inf`.
pub const PROB_FLOOR: f64 = 1e-15;

/// Analytic gradients of the regularized loss.
#[derive(Debug, Clone)]
pub struct Gradients {
    /// `(n_features, n_classes)`
    pub weights: Matrix,
    /// One entry per class.
    pub bias: Vec<f64>,
}

impl CrossEntropyLoss {
    /// Mean negative log-likelihood of the true class:
    ///   L = -mean_i ln(max(P[i, label_i], 1e-15))
    ///
    /// `probabilities` — `(n_samples, n_classes)`, rows from softmax
    /// `labels`        — one class index per row
    pub fn loss(probabilities: &Matrix, labels: &[usize]) -> f64 {
        assert_eq!(probabilities.rows(), labels.len(), "one label per probability row");
        if labels.is_empty() {
            return 0.0;
        }
        let total: f64 = probabilities.iter_rows()
            .zip(labels)
            .map(|(row, &label)| -row[label].max(PROB_FLOOR).ln())
            .sum();
        total / labels.len() as f64
    }

    /// `0.5 * lambda * sum(W²)`, or exactly zero when `lambda <= 0`.
    pub fn l2_penalty(weights: &Matrix, regularization: f64) -> f64 {
        if regularization > 0.0 {
            0.5 * regularization * weights.sum_squares()
        } else {
            0.0
        }
    }

    /// Loss plus L2 penalty, as recorded in the training loss history.
    pub fn regularized_loss(
        probabilities: &Matrix,
        labels: &[usize],
        weights: &Matrix,
        regularization: f64,
    ) -> f64 {
        Self::loss(probabilities, labels) + Self::l2_penalty(weights, regularization)
    }

    /// Gradient of the combined softmax + cross-entropy (+ L2) loss.
    ///
    ///   dScores = (P - Y) / n
    ///   dW      = Xᵀ · dScores + lambda · W      (penalty term only when lambda > 0)
    ///   dB      = column sums of dScores
    ///
    /// The penalty gradient is `lambda · W`, not halved: it is the derivative
    /// of `0.5 · lambda · ‖W‖²`.
    pub fn gradients(
        inputs: &Matrix,
        probabilities: &Matrix,
        targets: &Matrix,
        weights: &Matrix,
        regularization: f64,
    ) -> Gradients {
        let n = inputs.rows() as f64;
        let d_scores = (probabilities - targets).scale(1.0 / n);

        let mut d_weights = &inputs.transpose() * &d_scores;
        if regularization > 0.0 {
            d_weights = &d_weights + &weights.scale(regularization);
        }

        Gradients {
            weights: d_weights,
            bias: d_scores.sum_columns(),
        }
    }
}
