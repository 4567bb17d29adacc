pub mod handle;
pub mod persistence;
pub mod softmax_regression;

pub use handle::ModelHandle;
pub use persistence::{ModelFile, DEFAULT_MODEL_PATH, MODEL_FORMAT_VERSION};
pub use softmax_regression::{Parameters, SoftmaxRegression};
