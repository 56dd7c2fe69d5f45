//! Shared domain types.
//!
//! These types are kept serializable so the merged history can be:
//!
//! - handed to a presentation layer as JSON (`{regions, sortOrder}`)
//! - exported to a file from the CLI
//! - held in memory by the cache and shared across callers

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Which of the three parallel datasets a series comes from.
///
/// The same enum doubles as the ranking metric and the request filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Confirmed,
    Deaths,
    Recovered,
}

impl Kind {
    /// Fetch (and fold) order for unfiltered runs.
    pub const ALL: [Kind; 3] = [Kind::Confirmed, Kind::Deaths, Kind::Recovered];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Confirmed => "confirmed",
            Kind::Deaths => "deaths",
            Kind::Recovered => "recovered",
        }
    }

    /// Parse an optional caller-supplied filter.
    ///
    /// `None` means "all kinds"; anything other than the three names is a
    /// validation error.
    pub fn parse_filter(filter: Option<&str>) -> Result<Option<Kind>, HistoryError> {
        filter.map(str::parse).transpose()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Kind::Confirmed),
            "deaths" => Ok(Kind::Deaths),
            "recovered" => Ok(Kind::Recovered),
            other => Err(HistoryError::Validation(other.to_string())),
        }
    }
}

/// One observation: the cumulative count reported for a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDateTime,
    pub count: u64,
}

/// Identity and classification shared by every kind of a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBase {
    pub province: String,
    pub country: String,
    /// Merge key: `province` when non-empty, else `country`.
    pub region: String,
    pub is_china: bool,
    pub is_america: bool,
}

impl RegionBase {
    pub fn new(province: &str, country: &str) -> Self {
        let region = if province.is_empty() { country } else { province };
        let country_lower = country.to_lowercase();
        Self {
            province: province.to_string(),
            country: country.to_string(),
            region: region.to_string(),
            is_china: country_lower.contains("china"),
            is_america: country_lower == "us",
        }
    }
}

/// Decimal-degree coordinates of a region, present only on geo requests.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Geo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// A normalized row of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub base: RegionBase,
    pub kind: Kind,
    /// Kept observations in column order.
    pub points: Vec<DateCount>,
    /// Count of the last kept observation.
    pub latest: u64,
    pub geo: Option<Geo>,
}

/// The union of every kind's series for one region.
///
/// Per-kind fields are only ever written together through [`MergedRegion::set_series`],
/// so a present series always comes with its latest value and a kind that never
/// reported the region stays absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRegion {
    #[serde(flatten)]
    pub base: RegionBase,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_confirmed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_deaths: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_recovered: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<Vec<DateCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<Vec<DateCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<Vec<DateCount>>,

    #[serde(flatten)]
    pub geo: Option<Geo>,
}

impl MergedRegion {
    pub fn new(base: RegionBase) -> Self {
        Self {
            base,
            latest_confirmed: None,
            latest_deaths: None,
            latest_recovered: None,
            confirmed: None,
            deaths: None,
            recovered: None,
            geo: None,
        }
    }

    pub fn set_series(&mut self, kind: Kind, points: Vec<DateCount>, latest: u64) {
        match kind {
            Kind::Confirmed => {
                self.confirmed = Some(points);
                self.latest_confirmed = Some(latest);
            }
            Kind::Deaths => {
                self.deaths = Some(points);
                self.latest_deaths = Some(latest);
            }
            Kind::Recovered => {
                self.recovered = Some(points);
                self.latest_recovered = Some(latest);
            }
        }
    }

    pub fn series(&self, kind: Kind) -> Option<&[DateCount]> {
        match kind {
            Kind::Confirmed => self.confirmed.as_deref(),
            Kind::Deaths => self.deaths.as_deref(),
            Kind::Recovered => self.recovered.as_deref(),
        }
    }

    pub fn latest(&self, kind: Kind) -> Option<u64> {
        match kind {
            Kind::Confirmed => self.latest_confirmed,
            Kind::Deaths => self.latest_deaths,
            Kind::Recovered => self.latest_recovered,
        }
    }

    /// Kinds that have contributed a series to this region.
    pub fn kinds(&self) -> Vec<Kind> {
        Kind::ALL
            .into_iter()
            .filter(|k| self.series(*k).is_some())
            .collect()
    }
}

/// Region name → merged record.
pub type RegionMap = BTreeMap<String, MergedRegion>;

/// Region name → rank (0 = top).
pub type SortOrder = BTreeMap<String, usize>;

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResult {
    pub regions: RegionMap,
    pub sort_order: SortOrder,
}

/// The shape of a history request; one cache slot exists per distinct query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryQuery {
    pub filter: Option<Kind>,
    pub include_geo: bool,
}

impl HistoryQuery {
    /// Kinds to fetch, in fold order.
    pub fn kinds(&self) -> Vec<Kind> {
        match self.filter {
            Some(kind) => vec![kind],
            None => Kind::ALL.to_vec(),
        }
    }

    /// Ranking metric: the filter, or confirmed when unfiltered.
    pub fn metric(&self) -> Kind {
        self.filter.unwrap_or(Kind::Confirmed)
    }
}
