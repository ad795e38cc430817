//! JUnit XML report parsing.
//!
//! Turns one report document into a fixed [`TestCounts`] record, either from
//! the counters declared on the root element or by counting `testcase`
//! elements and their outcome markers.
//!
//! [`TestCounts`]: crate::models::TestCounts

mod parser;

pub use parser::parse_report;

use serde::{Deserialize, Serialize};

/// How counters are extracted from a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ParseStrategy {
    /// Declared attributes when all are present, element counting otherwise
    #[default]
    Auto,
    /// Only the `tests`/`skipped`/`failures`/`errors` attributes
    Attributes,
    /// Only counting `testcase` elements and their markers
    Elements,
}
