pub mod metrics;

pub use metrics::{accuracy, argmax, confusion_matrix};
