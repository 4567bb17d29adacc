use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::error::{Result, SoftmaxError};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::one_hot::one_hot;
use crate::math::matrix::Matrix;
use crate::model::softmax_regression::{forward, Parameters, SoftmaxRegression, INIT_STD_DEV};
use crate::optim::gd::GradientDescent;
use crate::train::fit_config::FitConfig;
use crate::train::iteration_stats::{FitReport, IterationStats};

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// `max(labels) + 1`, rejected when the weight matrix or the one-hot target
/// matrix it implies could not be addressed.
fn class_count(labels: &[usize], n_samples: usize, n_features: usize) -> Result<usize> {
    let max_label = labels.iter().copied().max().unwrap_or(0);
    let widest = n_samples.max(n_features);
    max_label
        .checked_add(1)
        .filter(|&k| {
            widest
                .checked_mul(k)
                .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| {
            SoftmaxError::InvalidLabel(format!(
                "label {max_label} implies more classes than can be allocated"
            ))
        })
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Runs full-batch gradient descent on `model` for its configured number of
/// iterations.
///
/// # Arguments
/// - `model`  — modified in place; parameters are allocated on the first fit
///              and continued from on later fits
/// - `inputs` — `(n_samples, n_features)` feature matrix
/// - `labels` — one class index per row; the class count is `max(labels) + 1`
/// - `config` — optional stop flag and progress channel
///
/// # Errors
/// - `EmptyInput` if `inputs` has no rows or no columns
/// - `LengthMismatch` if `labels.len() != inputs.rows()`
/// - `InvalidLabel` if the largest label gives a class count whose weight
///   matrix cannot be sized
/// - `ShapeMismatch` if the model already holds parameters whose feature or
///   class count differs from this data
///
/// On error the model is left exactly as it was.
///
/// # Early termination
/// Without a stop flag or progress channel the loop always runs every
/// iteration. It stops before the next iteration when `config.stop_flag` is
/// set, or after an iteration whose progress could not be delivered because
/// the receiver was dropped.
pub fn fit_loop(
    model: &mut SoftmaxRegression,
    inputs: &Matrix,
    labels: &[usize],
    config: &FitConfig,
) -> Result<FitReport> {
    let (n_samples, n_features) = inputs.shape();
    if n_samples == 0 {
        return Err(SoftmaxError::EmptyInput("training matrix"));
    }
    if n_features == 0 {
        return Err(SoftmaxError::EmptyInput("training features"));
    }
    if labels.len() != n_samples {
        return Err(SoftmaxError::LengthMismatch {
            what: "training labels",
            expected: n_samples,
            actual: labels.len(),
        });
    }
    let n_classes = class_count(labels, n_samples, n_features)?;

    if let Some(params) = &model.params {
        let (rows, cols) = params.weights.shape();
        if rows != n_features || cols != n_classes {
            return Err(SoftmaxError::shape(format!(
                "model holds parameters for {rows} features x {cols} classes, \
                 but the training data has {n_features} features x {n_classes} classes"
            )));
        }
    }

    let total = model.hyperparams.iterations;
    let regularization = model.hyperparams.regularization;
    let optimizer = GradientDescent::new(model.hyperparams.learning_rate);

    info!(
        "fitting softmax regression: samples={n_samples} features={n_features} \
         classes={n_classes} iterations={total} lr={} lambda={regularization}",
        optimizer.learning_rate
    );

    let seed = model.seed;
    let params = model.params.get_or_insert_with(|| {
        let weights = match seed {
            Some(seed) => Matrix::gaussian(
                n_features, n_classes, INIT_STD_DEV, &mut StdRng::seed_from_u64(seed),
            ),
            None => Matrix::gaussian(n_features, n_classes, INIT_STD_DEV, &mut rand::thread_rng()),
        };
        Parameters { weights, bias: vec![0.0; n_classes] }
    });

    let targets = one_hot(labels, n_classes);
    model.loss_history.clear();
    model.loss_history.reserve(total);

    let t_start = Instant::now();
    let log_every = (total / 10).max(1);
    let report_every = config.report_every.max(1);
    let mut stopped_early = false;

    for iteration in 1..=total {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                stopped_early = true;
                break;
            }
        }

        let (_, probabilities) = forward(params, inputs);

        let loss = CrossEntropyLoss::regularized_loss(
            &probabilities, labels, &params.weights, regularization,
        );
        model.loss_history.push(loss);

        let grads = CrossEntropyLoss::gradients(
            inputs, &probabilities, &targets, &params.weights, regularization,
        );
        optimizer.step(&mut params.weights, &mut params.bias, &grads);

        if iteration % log_every == 0 {
            debug!("iteration {iteration}/{total}: loss={loss:.6}");
        }

        if let Some(ref tx) = config.progress_tx {
            if iteration % report_every == 0 || iteration == total {
                let stats = IterationStats { iteration, total_iterations: total, loss };
                // Receiver gone: nobody is waiting for this fit any more.
                if tx.send(stats).is_err() {
                    stopped_early = true;
                    break;
                }
            }
        }
    }

    let report = FitReport {
        iterations_run: model.loss_history.len(),
        final_loss: model.loss_history.last().copied(),
        stopped_early,
    };

    if stopped_early {
        warn!("fit stopped early after {}/{total} iterations", report.iterations_run);
    }
    info!(
        "fit finished in {} ms: final loss {}",
        t_start.elapsed().as_millis(),
        report.final_loss.map_or_else(|| "n/a".to_string(), |l| format!("{l:.6}"))
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn toy() -> (Matrix, Vec<usize>) {
        let x = Matrix::from_rows(vec![
            vec![-1.0, -1.0],
            vec![-0.9, -1.1],
            vec![1.0, 1.0],
            vec![1.1, 0.9],
        ]).unwrap();
        (x, vec![0, 0, 1, 1])
    }

    #[test]
    fn runs_exact_iteration_count() {
        let (x, y) = toy();
        let mut model = SoftmaxRegression::new(0.1, 37, 0.0).with_seed(1);
        let report = fit_loop(&mut model, &x, &y, &FitConfig::default()).unwrap();
        assert_eq!(report.iterations_run, 37);
        assert!(!report.stopped_early);
        assert_eq!(model.loss_history().len(), 37);
        assert_eq!(report.final_loss, model.loss_history().last().copied());
    }

    #[test]
    fn zero_iterations_allocates_but_records_nothing() {
        let (x, y) = toy();
        let mut model = SoftmaxRegression::new(0.1, 0, 0.0);
        let report = fit_loop(&mut model, &x, &y, &FitConfig::default()).unwrap();
        assert_eq!(report.iterations_run, 0);
        assert_eq!(report.final_loss, None);
        assert!(model.is_trained());
    }

    #[test]
    fn stop_flag_set_before_start_runs_nothing() {
        let (x, y) = toy();
        let mut model = SoftmaxRegression::new(0.1, 100, 0.0);
        let flag = Arc::new(AtomicBool::new(true));
        let config = FitConfig::default().with_stop_flag(flag);
        let report = fit_loop(&mut model, &x, &y, &config).unwrap();
        assert!(report.stopped_early);
        assert_eq!(report.iterations_run, 0);
    }

    #[test]
    fn progress_is_reported_at_interval_and_end() {
        let (x, y) = toy();
        let mut model = SoftmaxRegression::new(0.1, 25, 0.0);
        let (tx, rx) = mpsc::channel();
        let config = FitConfig::default().with_progress(tx, 10);
        fit_loop(&mut model, &x, &y, &config).unwrap();
        drop(config);

        let seen: Vec<usize> = rx.iter().map(|s| s.iteration).collect();
        assert_eq!(seen, vec![10, 20, 25]);
    }

    #[test]
    fn dropped_receiver_stops_the_fit() {
        let (x, y) = toy();
        let mut model = SoftmaxRegression::new(0.1, 100, 0.0);
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let config = FitConfig::default().with_progress(tx, 1);
        let report = fit_loop(&mut model, &x, &y, &config).unwrap();
        assert!(report.stopped_early);
        assert_eq!(report.iterations_run, 1);
    }

    #[test]
    fn same_seed_gives_same_parameters() {
        let (x, y) = toy();
        let mut a = SoftmaxRegression::new(0.1, 50, 1e-3).with_seed(42);
        let mut b = SoftmaxRegression::new(0.1, 50, 1e-3).with_seed(42);
        fit_loop(&mut a, &x, &y, &FitConfig::default()).unwrap();
        fit_loop(&mut b, &x, &y, &FitConfig::default()).unwrap();
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }
}
