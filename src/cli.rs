use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments for paper-explorer.
#[derive(Parser, Debug)]
#[command(version, about = "Explore research-paper metadata: cleaning, statistics, charts and a filter dashboard")]
pub struct Args {
    /// Input table (.csv, .csv.zip, .csv.gz, .json, .parquet)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// TOML settings file (defaults to ./paper-explorer.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print dataset statistics and write static charts
    Report(ReportArgs),
    /// Open the interactive filter dashboard
    Dashboard,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportArgs {
    /// Directory the PNG charts are written to
    #[arg(long)]
    pub chart_dir: Option<PathBuf>,

    /// Print the console report only
    #[arg(long)]
    pub no_charts: bool,
}
