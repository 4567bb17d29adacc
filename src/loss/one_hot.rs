use crate::math::matrix::Matrix;

/// Builds the `(labels.len(), n_classes)` one-hot target matrix.
///
/// Every label must be below `n_classes`; callers check this before encoding.
pub fn one_hot(labels: &[usize], n_classes: usize) -> Matrix {
    let mut y = Matrix::zeros(labels.len(), n_classes);
    for (i, &label) in labels.iter().enumerate() {
        y.row_mut(i)[label] = 1.0;
    }
    y
}
