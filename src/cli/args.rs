//! Command line argument parsing using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::persistence::DEFAULT_MODEL_PATH;

/// ferrite-softmax - multinomial logistic regression from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "ferrite-softmax")]
#[command(about = "Train and run softmax regression classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct SoftmaxArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl SoftmaxArgs {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fit a model on a labelled CSV file and save it
    Train(TrainArgs),

    /// Predict classes and probabilities for a CSV file
    Predict(PredictArgs),

    /// Report accuracy and confusion matrix on a labelled CSV file
    Evaluate(EvaluateArgs),

    /// Fit the built-in three-cluster toy dataset and export CSVs
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Training CSV with a header row
    #[arg(short, long)]
    pub data: PathBuf,

    /// Name of the integer label column
    #[arg(short, long)]
    pub label: String,

    /// Where to write the trained model
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub out: PathBuf,

    /// JSON hyperparameter file; flags below override its values
    #[arg(short, long, env = "FERRITE_SOFTMAX_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub iterations: Option<usize>,

    #[arg(long)]
    pub regularization: Option<f64>,

    /// Seed for deterministic weight initialisation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the loss curve (iter,loss) to this CSV
    #[arg(long)]
    pub loss_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Trained model file
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// CSV of features with a header row
    #[arg(short, long)]
    pub data: PathBuf,

    /// Label column to drop from the input, if present
    #[arg(short, long)]
    pub label: Option<String>,

    /// Write x.., y_true, y_pred, p.. rows here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    #[arg(short, long)]
    pub data: PathBuf,

    #[arg(short, long)]
    pub label: String,
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Directory for the exported points and loss CSVs
    #[arg(long, default_value = "weights")]
    pub out_dir: PathBuf,
}
