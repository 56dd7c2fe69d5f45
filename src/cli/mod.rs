//! Command-line parsing for the case-history tool.
//!
//! Argument parsing stays here; dispatch lives in `app` and the pipeline
//! itself in `app::pipeline`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Kind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "case-history",
    version,
    about = "Merge confirmed/deaths/recovered time series into per-region history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, merge and print the history as JSON.
    History(HistoryArgs),
    /// Print the top regions for a metric as a table.
    Rank(RankArgs),
    /// Periodically request history through the cache and log a summary.
    Watch(WatchArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Only fetch and return one kind (confirmed, deaths, recovered).
    #[arg(short = 'f', long, value_enum)]
    pub filter: Option<Kind>,

    /// Include region coordinates.
    #[arg(long)]
    pub geo: bool,

    /// Pretty-print the JSON.
    #[arg(long)]
    pub pretty: bool,

    /// Write the JSON to a file instead of stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct RankArgs {
    /// Metric to rank by. All three kinds are fetched so every column is filled.
    #[arg(short = 'm', long, value_enum, default_value_t = Kind::Confirmed)]
    pub metric: Kind,

    /// Show the top-N regions.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct WatchArgs {
    /// Only fetch one kind.
    #[arg(short = 'f', long, value_enum)]
    pub filter: Option<Kind>,

    /// Seconds between requests.
    #[arg(long, default_value_t = 60)]
    pub every: u64,

    /// Stop after this many requests (runs until interrupted when omitted).
    #[arg(long)]
    pub count: Option<u64>,
}
