pub mod error;
pub mod config;
pub mod math;
pub mod activation;
pub mod loss;
pub mod optim;
pub mod model;
pub mod train;
pub mod eval;
pub mod data;
pub mod cli;

// Convenience re-exports
pub use error::{Result, SoftmaxError};
pub use config::Hyperparams;
pub use math::matrix::Matrix;
pub use model::softmax_regression::SoftmaxRegression;
pub use model::handle::ModelHandle;
pub use data::csv::Dataset;
pub use train::{FitConfig, FitReport, IterationStats};
