//! ferrite-softmax command line tool.
//!
//! Run with e.g.:
//!   cargo run -- demo
//!   cargo run -- train --data data.csv --label urgencia

use clap::Parser;
use ferrite_softmax::cli::{execute_command, SoftmaxArgs};

fn main() -> anyhow::Result<()> {
    let args = SoftmaxArgs::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_filter()),
    ).init();

    execute_command(args)
}
