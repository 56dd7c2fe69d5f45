//! Upstream data sources.

pub mod source;

pub use source::{FetchText, HttpFetcher, SourceUrls};
