//! Reporting utilities: region rankings and formatted terminal output.

pub mod format;

use std::cmp::Reverse;

use crate::domain::{Kind, MergedRegion, RegionMap, SortOrder};

pub use format::format_rankings;

/// Regions ordered by descending latest value of `metric`.
///
/// Ties are broken by region name; regions without the metric come last.
pub fn ranked_regions(regions: &RegionMap, metric: Kind) -> Vec<&MergedRegion> {
    let mut sorted: Vec<&MergedRegion> = regions.values().collect();
    sorted.sort_by(|a, b| {
        Reverse(a.latest(metric))
            .cmp(&Reverse(b.latest(metric)))
            .then_with(|| a.base.region.cmp(&b.base.region))
    });
    sorted
}

/// Map each region to its rank under `metric` (0 = highest).
pub fn rank_regions(regions: &RegionMap, metric: Kind) -> SortOrder {
    ranked_regions(regions, metric)
        .into_iter()
        .enumerate()
        .map(|(idx, region)| (region.base.region.clone(), idx))
        .collect()
}
