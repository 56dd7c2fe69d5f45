//! Folding normalized series into one record per region.

use tracing::debug;

use crate::domain::{MergedRegion, RegionMap, RegionSeries};

/// Merge series from any number of kinds into a fresh region map.
///
/// Inputs are folded in iteration order; callers pass kinds in fetch order.
pub fn merge_regions<I>(series: I) -> RegionMap
where
    I: IntoIterator<Item = RegionSeries>,
{
    let mut regions = RegionMap::new();
    merge_into(&mut regions, series);
    regions
}

/// Fold series into an existing region map.
///
/// A folded entity overwrites the base fields, its own kind's series and
/// latest value, and the coordinates when it carries them. Everything else
/// already on the record is left alone, so folding the same input twice
/// leaves the map unchanged.
pub fn merge_into<I>(regions: &mut RegionMap, series: I)
where
    I: IntoIterator<Item = RegionSeries>,
{
    let mut folded = 0usize;
    for entity in series {
        let RegionSeries {
            base,
            kind,
            points,
            latest,
            geo,
        } = entity;

        let record = regions
            .entry(base.region.clone())
            .or_insert_with(|| MergedRegion::new(base.clone()));
        record.base = base;
        record.set_series(kind, points, latest);
        if geo.is_some() {
            record.geo = geo;
        }
        folded += 1;
    }
    debug!("Merged {folded} series into {} regions", regions.len());
}
