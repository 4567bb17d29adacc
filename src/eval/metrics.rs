//! Argmax decoding and classification metrics.
//!
//! These only look at predicted and true class indices; they never touch
//! model parameters.

use crate::error::{Result, SoftmaxError};

/// Index of the maximum element; the first of several equal maxima wins.
/// Returns 0 for an empty slice.
pub fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (k, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = k;
        }
    }
    best
}

/// Fraction of exact matches between `predictions` and `labels`.
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> Result<f64> {
    if predictions.len() != labels.len() {
        return Err(SoftmaxError::LengthMismatch {
            what: "accuracy labels",
            expected: predictions.len(),
            actual: labels.len(),
        });
    }
    if labels.is_empty() {
        return Err(SoftmaxError::EmptyInput("accuracy labels"));
    }
    let correct = predictions.iter().zip(labels).filter(|(p, y)| p == y).count();
    Ok(correct as f64 / labels.len() as f64)
}

/// `counts[true][predicted]`, `n_classes` square.
///
/// Labels or predictions outside `0..n_classes` are rejected.
pub fn confusion_matrix(
    predictions: &[usize],
    labels: &[usize],
    n_classes: usize,
) -> Result<Vec<Vec<usize>>> {
    if predictions.len() != labels.len() {
        return Err(SoftmaxError::LengthMismatch {
            what: "confusion matrix labels",
            expected: predictions.len(),
            actual: labels.len(),
        });
    }
    let mut counts = vec![vec![0usize; n_classes]; n_classes];
    for (&p, &y) in predictions.iter().zip(labels) {
        if p >= n_classes || y >= n_classes {
            return Err(SoftmaxError::InvalidLabel(format!(
                "class {} outside 0..{n_classes}",
                p.max(y)
            )));
        }
        counts[y][p] += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_breaks_ties_low() {
        assert_eq!(argmax(&[0.2, 0.5, 0.3]), 1);
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[0.1, 0.45, 0.45]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]).unwrap(), 0.75);
        assert!(matches!(
            accuracy(&[0, 1], &[0]),
            Err(SoftmaxError::LengthMismatch { .. })
        ));
        assert!(accuracy(&[], &[]).is_err());
    }

    #[test]
    fn confusion_rows_are_true_classes() {
        let cm = confusion_matrix(&[0, 1, 1, 2], &[0, 1, 2, 2], 3).unwrap();
        assert_eq!(cm, vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 1, 1]]);
        assert!(confusion_matrix(&[3], &[0], 3).is_err());
    }
}
