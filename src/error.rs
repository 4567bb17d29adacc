//! Error type shared by every fallible operation in the crate.
//!
//! Precondition violations (empty data, mismatched lengths, wrong shapes) and
//! use of an untrained model are reported through [`SoftmaxError`] instead of
//! aborting, so the engine can be embedded in a long-running process.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoftmaxError {
    /// A matrix or label slice with no rows was supplied where data is required.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Two sequences that must have the same length do not.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Feature or class dimensions disagree with the model or with each other.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The named operation needs fitted or loaded parameters.
    #[error("{0}: model not trained")]
    NotTrained(&'static str),

    #[error("invalid label: {0}")]
    InvalidLabel(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed model file or dataset content.
    #[error("format error: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SoftmaxError {
    pub fn shape(msg: impl Into<String>) -> Self {
        SoftmaxError::ShapeMismatch(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        SoftmaxError::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SoftmaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_operation() {
        let err = SoftmaxError::NotTrained("predict_probabilities");
        assert_eq!(err.to_string(), "predict_probabilities: model not trained");

        let err = SoftmaxError::LengthMismatch { what: "labels", expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "length mismatch for labels: expected 3, got 2");
    }

    #[test]
    fn io_errors_convert() {
        let io = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: SoftmaxError = io.into();
        assert!(matches!(err, SoftmaxError::Io(_)));
    }
}
