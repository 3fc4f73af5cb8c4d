//! Retail features CLI module
//!
//! Command-line interface for running the feature pipeline on generated
//! transaction tables and managing its configuration.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::preprocessing::{FeatureConfig, FeaturePipeline};
use crate::utils::sample_transactions;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "retail-features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encode and scale retail transaction tables into model features")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline on a generated transaction table
    Run {
        /// Number of transactions to generate
        #[arg(short, long, default_value = "10000")]
        rows: usize,

        /// Random seed for the generator
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Pipeline configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the first rows of the feature table
        #[arg(long)]
        show: bool,
    },

    /// Print or write the default configuration
    Config {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> anyhow::Result<FeatureConfig> {
    let config = match path {
        Some(path) => FeatureConfig::load(path)?,
        None => FeatureConfig::default(),
    };
    Ok(config)
}

pub fn cmd_run(rows: usize, seed: u64, config_path: Option<&Path>, show: bool) -> anyhow::Result<()> {
    section("Run");

    let config = load_config(config_path)?;
    if let Some(path) = config_path {
        step_ok(&format!("Config {}", path.display()));
    }

    step_run("Generating transactions");
    let start = Instant::now();
    let df = sample_transactions(rows, seed)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Encoding and scaling");
    let start = Instant::now();
    let mut pipeline = FeaturePipeline::with_config(config.clone());
    let set = pipeline.fit_transform(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    section("Features");
    kv("Rows", &set.n_samples().to_string());
    kv("Columns", &set.features.width().to_string());
    kv("Excluded", &pipeline.encoder().excluded_columns().join(", "));
    if let Some(bands) = pipeline.encoder().age_bands() {
        kv("Age bands", &bands.bands().join(" < "));
    }

    section("Scaling");
    if let Some((mean, std)) = pipeline.scaler().target_params() {
        kv(&config.target_column, &format!("mean {:.2}, std {:.2}", mean, std));
    }
    for column in config.minmax_columns() {
        if let Some((min, range)) = pipeline.scaler().minmax_params(column) {
            kv(column, &format!("min {:.2}, max {:.2}", min, min + range));
        }
    }

    if show {
        section("Preview");
        println!("{}", set.features.head(Some(5)));
    }

    println!();
    Ok(())
}

pub fn cmd_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = FeatureConfig::default();
    match output {
        Some(path) => {
            config.save(path)?;
            step_ok(&format!("Wrote {}", path.display()));
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
