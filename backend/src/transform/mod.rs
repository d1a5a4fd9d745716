//! Transformation module.
//!
//! This module turns a raw table into dashboard figures:
//! - Clean: null handling, deduplication, date and sales coercion
//! - Filter: region/category inclusion sets
//! - Grouper: grouped sums, top-N rankings, key metrics
//! - Pipeline: load once, then filter and aggregate per selection

pub mod clean;
pub mod filter;
pub mod grouper;
pub mod pipeline;

pub use clean::{clean, detect_notices, CleaningReport};
pub use filter::{apply, FilterOptions, FilterSelection};
pub use grouper::{AggregationResult, GroupTotal, KeyMetrics};
pub use pipeline::*;
