//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initialises logging
//! - parses CLI arguments and loads configuration
//! - runs the history service
//! - prints JSON / tables or writes exports

use std::io::Write;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, HistoryArgs, RankArgs, WatchArgs};
use crate::config::ServiceConfig;
use crate::domain::HistoryQuery;
use crate::error::{AppError, HistoryError};
use crate::report::{format_rankings, ranked_regions};
use crate::service::{HistoryService, Origin};

pub mod pipeline;

/// Entry point for the `case-history` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let cli = crate::cli::Cli::parse();
    let config = ServiceConfig::from_env()?;
    let service = HistoryService::from_config(&config)?;

    match cli.command {
        Command::History(args) => handle_history(&service, args),
        Command::Rank(args) => handle_rank(&service, args),
        Command::Watch(args) => handle_watch(&service, args),
    }
}

fn init_tracing() {
    // Logs go to stderr so JSON on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_history<F: crate::data::FetchText>(service: &HistoryService<F>, args: HistoryArgs) -> Result<(), AppError> {
    let query = HistoryQuery {
        filter: args.filter,
        include_geo: args.geo,
    };
    let served = service.serve(query)?;

    match &args.out {
        Some(path) => {
            crate::io::export::write_history_file(path, &served.result, args.pretty)?;
            info!("Wrote {} regions to {}", served.result.regions.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::export::write_history_json(&mut lock, &served.result, args.pretty)?;
            writeln!(lock).map_err(|e| AppError::new(2, format!("Failed to write output: {e}")))?;
        }
    }

    Ok(())
}

fn handle_rank<F: crate::data::FetchText>(service: &HistoryService<F>, args: RankArgs) -> Result<(), AppError> {
    println!("{}", rank_table(service, &args)?);
    Ok(())
}

/// Rankings table for `args.metric`, with every kind's latest count shown.
fn rank_table<F: crate::data::FetchText>(service: &HistoryService<F>, args: &RankArgs) -> Result<String, HistoryError> {
    // Unfiltered, so the other columns are populated; ordering comes from the metric.
    let query = HistoryQuery {
        filter: None,
        include_geo: false,
    };
    let served = service.serve(query)?;
    Ok(format_rankings(&served.result, args.metric, args.top))
}

fn handle_watch<F: crate::data::FetchText>(service: &HistoryService<F>, args: WatchArgs) -> Result<(), AppError> {
    let query = HistoryQuery {
        filter: args.filter,
        include_geo: false,
    };
    let interval = Duration::from_secs(args.every);
    let mut tick = 0u64;

    loop {
        match service.serve(query) {
            Ok(served) => {
                let metric = query.metric();
                let top = ranked_regions(&served.result.regions, metric)
                    .first()
                    .map(|r| format!("{} ({})", r.base.region, r.latest(metric).unwrap_or(0)))
                    .unwrap_or_else(|| "-".to_string());
                info!(
                    "tick={} source={} regions={} top_{}={}",
                    tick,
                    match served.origin {
                        Origin::Cache => "cache",
                        Origin::Fresh => "upstream",
                    },
                    served.result.regions.len(),
                    metric,
                    top
                );
            }
            // A failed refresh keeps the previous entry; try again next tick.
            Err(err) => warn!("tick={tick} refresh failed: {err}"),
        }

        tick += 1;
        if args.count.is_some_and(|n| tick >= n) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}
