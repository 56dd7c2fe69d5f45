//! Time-series normalization.
//!
//! Converts the parsed rows of one dataset into per-region series:
//!
//! - row 0 is the header: `province, country, lat, lng, <date>...`
//! - every later row contributes one `RegionSeries`
//! - value cells that are not non-negative integers are dropped, not zeroed
//!
//! This module is pure: no fetching, no merging.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{DateCount, Geo, Kind, RegionBase, RegionSeries};
use crate::error::HistoryError;

/// Leading non-date columns of every dataset.
const BASE_COLUMNS: usize = 4;

/// What to do with a row whose series ends up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySeriesPolicy {
    /// Drop the row from this kind and log a warning.
    #[default]
    Skip,
    /// Fail the run with `HistoryError::EmptySeries`.
    Reject,
}

impl FromStr for EmptySeriesPolicy {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(EmptySeriesPolicy::Skip),
            "reject" => Ok(EmptySeriesPolicy::Reject),
            other => Err(HistoryError::InvalidConfig(format!(
                "empty series policy must be `skip` or `reject`, got `{other}`"
            ))),
        }
    }
}

/// Options for one normalization pass.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub kind: Kind,
    pub include_geo: bool,
    pub empty_series: EmptySeriesPolicy,
}

/// Parse and normalize one dataset's CSV text.
pub fn normalize_csv(text: &str, opts: NormalizeOptions) -> Result<Vec<RegionSeries>, HistoryError> {
    let rows = crate::io::tabular::parse_rows(text)?;
    normalize_rows(&rows, opts)
}

/// Normalize already-parsed rows of one dataset.
pub fn normalize_rows(rows: &[StringRecord], opts: NormalizeOptions) -> Result<Vec<RegionSeries>, HistoryError> {
    let header = rows
        .first()
        .ok_or_else(|| HistoryError::parse(1, format!("{} data has no header row", opts.kind)))?;

    if header.len() < BASE_COLUMNS {
        return Err(HistoryError::parse(
            1,
            format!(
                "header has {} columns, expected at least {BASE_COLUMNS} (province, country, lat, lng)",
                header.len()
            ),
        ));
    }

    let dates = header
        .iter()
        .skip(BASE_COLUMNS)
        .enumerate()
        .map(|(idx, raw)| {
            parse_header_date(raw).ok_or_else(|| {
                HistoryError::parse(
                    1,
                    format!("column {} header '{raw}' is not a M/D/YY date", idx + BASE_COLUMNS + 1),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(rows.len().saturating_sub(1));
    let mut skipped = 0usize;

    for row in rows.iter().skip(1) {
        let province = row.get(0).unwrap_or("");
        let country = row.get(1).unwrap_or("");
        let base = RegionBase::new(province, country);

        let points: Vec<DateCount> = row
            .iter()
            .skip(BASE_COLUMNS)
            .zip(&dates)
            .filter_map(|(cell, date)| {
                parse_count(cell).map(|count| DateCount { date: *date, count })
            })
            .collect();

        let Some(latest) = points.last().map(|p| p.count) else {
            match opts.empty_series {
                EmptySeriesPolicy::Reject => {
                    return Err(HistoryError::EmptySeries {
                        kind: opts.kind,
                        region: base.region,
                    });
                }
                EmptySeriesPolicy::Skip => {
                    warn!("Skipping {} row for '{}': no usable values", opts.kind, base.region);
                    skipped += 1;
                    continue;
                }
            }
        };

        let geo = opts.include_geo.then(|| Geo {
            lat: parse_coordinate(row.get(2)),
            lng: parse_coordinate(row.get(3)),
        });

        out.push(RegionSeries {
            base,
            kind: opts.kind,
            points,
            latest,
            geo,
        });
    }

    debug!(
        "Normalized {} data - rows={}, dates={}, skipped={}",
        opts.kind,
        out.len(),
        dates.len(),
        skipped
    );

    Ok(out)
}

/// Parse a date header such as `1/22/20 13:00` or `1/22/20`.
fn parse_header_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%m/%d/%y %H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%y")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_count(cell: &str) -> Option<u64> {
    cell.trim().parse::<u64>().ok()
}

fn parse_coordinate(cell: Option<&str>) -> Option<f64> {
    let v = cell?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
