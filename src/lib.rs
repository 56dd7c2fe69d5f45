//! `case-history` library crate.
//!
//! The binary (`case-history`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without network access or spawning processes
//! - the cached service can be embedded behind any transport
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod merge;
pub mod report;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
