//! Command line front end for training, prediction and evaluation.

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::execute_command;
