pub mod fit_config;
pub mod iteration_stats;
pub mod loop_fn;

pub use fit_config::FitConfig;
pub use iteration_stats::{FitReport, IterationStats};
pub use loop_fn::fit_loop;
