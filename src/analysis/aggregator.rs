//! Per-subproject aggregation of report counts.
//!
//! This module folds the counts of every report file into one summary per
//! subproject and computes the grand totals.

use crate::error::Result;
use crate::junit::{self, ParseStrategy};
use crate::models::{Report, ReportFile, SubprojectSummary, TestCounts};
use crate::scanner::{ReportScanner, ScanConfig};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Discover, parse and aggregate every report under `root`.
///
/// Stops at the first unreadable or malformed report; no partial report is
/// returned.
pub fn summarize(root: &Path, scan_config: &ScanConfig, strategy: ParseStrategy) -> Result<Report> {
    let scanner = ReportScanner::new(root.to_path_buf(), scan_config.clone())?;
    let files = scanner.scan()?;
    info!("Reading {} report file(s)", files.len());

    let mut parsed = Vec::with_capacity(files.len());
    for file in files {
        let counts = junit::parse_report(&file.path, strategy)?;
        debug!(
            "{}: {} tests, {} failures, {} errors",
            file.relative_path, counts.tests, counts.failures, counts.errors
        );
        parsed.push((file.subproject, counts));
    }

    Ok(aggregate(parsed))
}

/// Fold `(subproject, counts)` pairs into a report sorted by subproject name.
pub fn aggregate<I>(reports: I) -> Report
where
    I: IntoIterator<Item = (String, TestCounts)>,
{
    let mut groups: BTreeMap<String, (TestCounts, usize)> = BTreeMap::new();
    let mut report_files = 0;

    for (subproject, counts) in reports {
        let (total, files) = groups.entry(subproject).or_default();
        *total += counts;
        *files += 1;
        report_files += 1;
    }

    let subprojects: Vec<SubprojectSummary> = groups
        .into_iter()
        .map(|(name, (counts, files))| SubprojectSummary::new(name, counts, files))
        .collect();

    let mut totals = TestCounts::default();
    for summary in &subprojects {
        totals += summary.counts;
    }

    Report {
        subprojects,
        totals,
        report_files,
    }
}

/// Group discovered report files by subproject, in name order.
pub fn group_by_subproject(files: &[ReportFile]) -> BTreeMap<&str, Vec<&ReportFile>> {
    let mut grouped: BTreeMap<&str, Vec<&ReportFile>> = BTreeMap::new();

    for file in files {
        grouped.entry(file.subproject.as_str()).or_default().push(file);
    }

    grouped
}
