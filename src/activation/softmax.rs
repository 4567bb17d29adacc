use crate::math::matrix::Matrix;

/// Numerically stable softmax over a single row, in place.
///
/// The row maximum is subtracted before exponentiating so that large scores
/// never overflow `exp`. An empty row is left untouched.
pub fn softmax_in_place(row: &mut [f64]) {
    let Some(&first) = row.first() else {
        return;
    };
    let max = row.iter().skip(1).fold(first, |m, &x| if x > m { x } else { m });

    let mut sum = 0.0;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in row.iter_mut() {
        *v /= sum;
    }
}

/// Applies [`softmax_in_place`] to every row of `scores`.
pub fn softmax_rows(scores: &Matrix) -> Matrix {
    let mut out = scores.clone();
    for i in 0..out.rows() {
        softmax_in_place(out.row_mut(i));
    }
    out
}
