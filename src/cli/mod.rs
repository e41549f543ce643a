//! Command-line parsing for the bank rate advisor.
//!
//! Parsing lives here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::RegressorKind;
use crate::io::{DEFAULT_HISTORY_PATH, DEFAULT_MODEL_PATH};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "advisor", version, about = "Rank banks by predicted investment return")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect current rates, rank banks, and print the recommendation report.
    Recommend(RecommendArgs),
    /// Show the stored model parameters.
    Model(ModelArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RecommendArgs {
    /// Amount to invest.
    #[arg(short = 'a', long, default_value_t = 100_000.0)]
    pub amount: f64,

    /// Investment term in days.
    #[arg(short = 't', long = "term", default_value_t = 365)]
    pub term_days: u32,

    /// Return model to fit on the collected records.
    #[arg(long, value_enum, default_value_t = RegressorKind::Mlp)]
    pub model: RegressorKind,

    /// Seed for synthetic data and the heuristic jitter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip bank websites and use synthetic rates.
    #[arg(long)]
    pub offline: bool,

    /// History CSV (read, then rewritten with the current records).
    #[arg(long, value_name = "CSV", default_value = DEFAULT_HISTORY_PATH)]
    pub history: PathBuf,

    /// Where fitted model parameters are saved.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Also write the recommendations to this text file.
    #[arg(long, value_name = "TXT")]
    pub save_report: Option<PathBuf>,

    /// Skip the detailed analysis of the best bank.
    #[arg(long)]
    pub no_detail: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    /// Model JSON written by `advisor recommend`.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,
}
