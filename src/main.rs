//! Retail features - Main Entry Point
//!
//! Runs the encode-and-scale pipeline from the command line.

use clap::Parser;
use retail_features::cli::{cmd_config, cmd_run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retail_features=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { rows, seed, config, show } => {
            cmd_run(rows, seed, config.as_deref(), show)?;
        }
        Commands::Config { output } => {
            cmd_config(output.as_deref())?;
        }
    }

    Ok(())
}
