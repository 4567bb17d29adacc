//! CSV dataset loading.
//!
//! Supported format:
//! - UTF-8, comma-separated
//! - A header row is required; the label column is located by name and
//!   every other column is a feature, in header order
//! - Double-quoted fields with embedded commas are handled
//! - Blank lines are skipped
//!
//! Labels must be non-negative integers; features must parse as `f64`.

use std::path::Path;

use log::debug;

use crate::error::{Result, SoftmaxError};
use crate::math::matrix::Matrix;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Feature matrix plus integer class labels, one per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Matrix,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `max(label) + 1`, the class count a fit on this data will derive.
    pub fn class_count(&self) -> usize {
        self.labels.iter().copied().max().map_or(0, |m| m + 1)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads and parses a labelled CSV file. See [`parse_dataset`].
pub fn load_dataset(path: impl AsRef<Path>, label_column: &str) -> Result<Dataset> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_dataset(&text, label_column)
}

/// Parses labelled CSV text whose header contains `label_column`.
pub fn parse_dataset(text: &str, label_column: &str) -> Result<Dataset> {
    let (header, rows) = split_header(text)?;

    let label_idx = header.iter().position(|h| h.trim() == label_column).ok_or_else(|| {
        SoftmaxError::format(format!("no column named '{label_column}' in CSV header"))
    })?;
    if header.len() < 2 {
        return Err(SoftmaxError::format(
            "CSV needs at least one feature column besides the label",
        ));
    }

    let feature_names: Vec<String> = header.iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, h)| h.trim().to_string())
        .collect();

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (line_no, cells) in rows {
        check_width(&cells, header.len(), line_no)?;

        let mut feats = Vec::with_capacity(feature_names.len());
        for (j, cell) in cells.iter().enumerate() {
            if j == label_idx {
                labels.push(parse_label(cell, line_no)?);
            } else {
                feats.push(parse_float(cell, line_no)?);
            }
        }
        features.push(feats);
    }

    if labels.is_empty() {
        return Err(SoftmaxError::EmptyInput("CSV data rows"));
    }

    debug!(
        "parsed CSV dataset: {} rows, {} features, label column '{label_column}'",
        labels.len(),
        feature_names.len()
    );

    Ok(Dataset {
        feature_names,
        features: Matrix::from_rows(features)?,
        labels,
    })
}

/// Reads and parses an unlabelled CSV file. See [`parse_features`].
pub fn load_features(path: impl AsRef<Path>) -> Result<(Vec<String>, Matrix)> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_features(&text)
}

/// Parses CSV text where every column is a feature (header required).
pub fn parse_features(text: &str) -> Result<(Vec<String>, Matrix)> {
    let (header, rows) = split_header(text)?;
    let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    let mut features = Vec::new();
    for (line_no, cells) in rows {
        check_width(&cells, header.len(), line_no)?;
        features.push(
            cells.iter()
                .map(|c| parse_float(c, line_no))
                .collect::<Result<Vec<f64>>>()?,
        );
    }
    Ok((names, Matrix::from_rows(features)?))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

type Rows = Vec<(usize, Vec<String>)>;

/// Splits into header cells and `(1-based line number, cells)` data rows.
fn split_header(text: &str) -> Result<(Vec<String>, Rows)> {
    let mut lines = text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (_, header_line) = lines.next()
        .ok_or_else(|| SoftmaxError::format("CSV is empty; a header row is required"))?;
    let header = parse_csv_row(header_line);
    let rows = lines.map(|(n, l)| (n, parse_csv_row(l))).collect();
    Ok((header, rows))
}

fn check_width(cells: &[String], expected: usize, line_no: usize) -> Result<()> {
    if cells.len() != expected {
        return Err(SoftmaxError::shape(format!(
            "line {line_no}: expected {expected} columns, got {}",
            cells.len()
        )));
    }
    Ok(())
}

/// Parses a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside quoted field.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_float(cell: &str, line_no: usize) -> Result<f64> {
    cell.trim().parse::<f64>().map_err(|_| {
        SoftmaxError::format(format!("line {line_no}: '{cell}' is not a valid number"))
    })
}

fn parse_label(cell: &str, line_no: usize) -> Result<usize> {
    cell.trim().parse::<usize>().map_err(|_| {
        SoftmaxError::InvalidLabel(format!(
            "line {line_no}: '{cell}' is not a non-negative integer class index"
        ))
    })
}
