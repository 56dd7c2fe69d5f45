//! Input/output helpers.
//!
//! - delimited text parsing (`tabular`)
//! - per-dataset series normalization (`normalize`)
//! - JSON export of merged results (`export`)

pub mod export;
pub mod normalize;
pub mod tabular;

pub use export::*;
pub use normalize::{EmptySeriesPolicy, NormalizeOptions, normalize_csv, normalize_rows};
pub use tabular::parse_rows;
