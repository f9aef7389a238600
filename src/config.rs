use std::path::PathBuf;

use clap::Parser;

/// Titanic survival dashboard.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Cleaned passenger table (.csv, .json or .parquet)
    #[arg(long, default_value = "data/tested_cleaned.csv")]
    pub data: PathBuf,

    /// Fitted classifier artifact (.json or .msgpack)
    #[arg(long, default_value = "models/logistic_regression.json")]
    pub model: PathBuf,

    /// Print the overview and evaluation to stdout instead of opening a window
    #[arg(long)]
    pub report: bool,
}
