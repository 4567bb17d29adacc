use crate::data::csv::Dataset;
use crate::math::matrix::Matrix;

/// Nine 2-D points in three linearly separable clusters around
/// (-1, -1), (0, 1) and (2, 2), labelled 0, 1 and 2.
pub fn three_clusters() -> Dataset {
    let rows = vec![
        vec![-1.0, -1.2],
        vec![-0.8, -0.9],
        vec![-1.2, -1.1],

        vec![0.0, 1.0],
        vec![0.2, 0.8],
        vec![-0.1, 1.1],

        vec![2.0, 2.1],
        vec![1.8, 1.9],
        vec![2.2, 2.0],
    ];
    Dataset {
        feature_names: vec!["x1".into(), "x2".into()],
        features: Matrix::from_rows(rows).unwrap_or_default(),
        labels: vec![0, 0, 0, 1, 1, 1, 2, 2, 2],
    }
}

/// Unlabelled probe points near each cluster centre.
pub fn three_clusters_probe() -> Matrix {
    Matrix::from_rows(vec![
        vec![-1.0, -0.8],
        vec![0.1, 1.2],
        vec![2.1, 2.0],
    ]).unwrap_or_default()
}
