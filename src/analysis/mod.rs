//! Analysis modules.
//!
//! Aggregation of parsed report counts into per-subproject summaries.

pub mod aggregator;

pub use aggregator::*;
