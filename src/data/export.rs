//! CSV exports for plotting fitted models outside of Rust.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SoftmaxError};
use crate::eval::metrics::argmax;
use crate::math::matrix::Matrix;

/// Writes one row per sample: `x1..xd, y_true, y_pred, p0..pK-1`.
///
/// `y_true` is `-1` when `labels` is `None`. `y_pred` is the argmax of the
/// probability row.
pub fn write_points_csv(
    path: impl AsRef<Path>,
    inputs: &Matrix,
    labels: Option<&[usize]>,
    probabilities: &Matrix,
) -> Result<()> {
    if probabilities.rows() != inputs.rows() {
        return Err(SoftmaxError::LengthMismatch {
            what: "probability rows",
            expected: inputs.rows(),
            actual: probabilities.rows(),
        });
    }
    if let Some(labels) = labels {
        if labels.len() != inputs.rows() {
            return Err(SoftmaxError::LengthMismatch {
                what: "exported labels",
                expected: inputs.rows(),
                actual: labels.len(),
            });
        }
    }

    let mut w = BufWriter::new(File::create(path)?);

    let mut header: Vec<String> = (1..=inputs.cols()).map(|j| format!("x{j}")).collect();
    header.push("y_true".into());
    header.push("y_pred".into());
    header.extend((0..probabilities.cols()).map(|k| format!("p{k}")));
    writeln!(w, "{}", header.join(","))?;

    for (i, (x, p)) in inputs.iter_rows().zip(probabilities.iter_rows()).enumerate() {
        let mut record: Vec<String> = x.iter().map(|v| format!("{v:.6}")).collect();
        record.push(labels.map_or_else(|| "-1".to_string(), |l| l[i].to_string()));
        record.push(argmax(p).to_string());
        record.extend(p.iter().map(|v| format!("{v:.6}")));
        writeln!(w, "{}", record.join(","))?;
    }

    w.flush()?;
    Ok(())
}

/// Writes the loss curve as `iter,loss` rows, iterations counted from 0.
pub fn write_loss_csv(path: impl AsRef<Path>, loss_history: &[f64]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "iter,loss")?;
    for (i, loss) in loss_history.iter().enumerate() {
        writeln!(w, "{i},{loss:.6}")?;
    }
    w.flush()?;
    Ok(())
}
