//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the dataset kind / metric enum (`Kind`)
//! - per-dataset normalized rows (`RegionSeries`)
//! - the merged per-region record and run output (`MergedRegion`, `HistoryResult`)

pub mod types;

pub use types::*;
