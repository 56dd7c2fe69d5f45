//! Shared history pipeline used by the service and the CLI front-ends.
//!
//! fetch (concurrently, per kind) -> normalize -> merge -> rank
//!
//! Normalization and merging only start once every fetch has succeeded, and
//! any failure aborts the run with no partial result.

use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::data::{FetchText, SourceUrls};
use crate::domain::{HistoryQuery, HistoryResult, Kind};
use crate::error::HistoryError;
use crate::io::normalize::{EmptySeriesPolicy, NormalizeOptions, normalize_csv};
use crate::merge::merge_regions;
use crate::report::rank_regions;

/// Fetch the raw CSV text for each kind, in parallel, preserving order.
pub fn fetch_sources<F: FetchText + ?Sized>(
    fetcher: &F,
    sources: &SourceUrls,
    kinds: &[Kind],
) -> Result<Vec<(Kind, String)>, HistoryError> {
    kinds
        .par_iter()
        .map(|&kind| fetcher.fetch_text(sources.url(kind)).map(|text| (kind, text)))
        .collect()
}

/// Turn already-fetched texts into a ranked history.
pub fn build_history(
    texts: &[(Kind, String)],
    query: &HistoryQuery,
    empty_series: EmptySeriesPolicy,
) -> Result<HistoryResult, HistoryError> {
    let mut series = Vec::new();
    for (kind, text) in texts {
        let opts = NormalizeOptions {
            kind: *kind,
            include_geo: query.include_geo,
            empty_series,
        };
        series.extend(normalize_csv(text, opts)?);
    }

    let regions = merge_regions(series);
    let sort_order = rank_regions(&regions, query.metric());

    Ok(HistoryResult { regions, sort_order })
}

/// Execute one full run for `query`.
pub fn run_history<F: FetchText + ?Sized>(
    fetcher: &F,
    sources: &SourceUrls,
    query: &HistoryQuery,
    empty_series: EmptySeriesPolicy,
) -> Result<HistoryResult, HistoryError> {
    let start = Instant::now();

    let texts = fetch_sources(fetcher, sources, &query.kinds())?;
    let result = build_history(&texts, query, empty_series)?;

    info!(
        "History run completed - filter={}, geo={}, regions={}, duration={:.2}s",
        query.filter.map(Kind::as_str).unwrap_or("all"),
        query.include_geo,
        result.regions.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(result)
}
