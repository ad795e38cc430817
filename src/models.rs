//! Data models for test report aggregation.
//!
//! This module contains the records produced by each stage of the run:
//! per-file counts, discovered report locations, per-subproject summaries
//! and the final report.

use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Counters extracted from one report file, or summed over many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestCounts {
    /// Total number of test cases.
    pub tests: u64,
    /// Test cases carrying no failure, error or skipped marker.
    pub passed: u64,
    /// Skipped test cases.
    pub skipped: u64,
    /// Test cases that failed an assertion.
    pub failures: u64,
    /// Test cases that raised an unexpected error.
    pub errors: u64,
}

impl TestCounts {
    /// Builds counts from the four counters a report declares, deriving `passed`.
    pub fn from_declared(tests: u64, skipped: u64, failures: u64, errors: u64) -> Self {
        let passed = tests
            .saturating_sub(skipped)
            .saturating_sub(failures)
            .saturating_sub(errors);
        Self {
            tests,
            passed,
            skipped,
            failures,
            errors,
        }
    }

    /// True when the declared outcomes add up to more than `tests`.
    pub fn is_inconsistent(&self) -> bool {
        self.skipped
            .checked_add(self.failures)
            .and_then(|sum| sum.checked_add(self.errors))
            .map_or(true, |outcomes| outcomes > self.tests)
    }

    /// Returns the verdict for these counts.
    pub fn status(&self) -> Status {
        if self.failures == 0 && self.errors == 0 {
            Status::Pass
        } else {
            Status::Fail
        }
    }
}

impl AddAssign for TestCounts {
    fn add_assign(&mut self, other: Self) {
        self.tests += other.tests;
        self.passed += other.passed;
        self.skipped += other.skipped;
        self.failures += other.failures;
        self.errors += other.errors;
    }
}

/// Pass/fail verdict for a subproject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn is_pass(&self) -> bool {
        matches!(self, Status::Pass)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

/// A report file located under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    /// Path used to open the file.
    pub path: PathBuf,
    /// Path relative to the scan root, with `/` separators.
    pub relative_path: String,
    /// First segment of the relative path.
    pub subproject: String,
}

/// Summed counts for one subproject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubprojectSummary {
    /// Subproject name (group key).
    pub name: String,
    /// Verdict derived from the summed counts.
    pub status: Status,
    /// Number of report files folded into this summary.
    pub report_files: usize,
    /// Summed counters.
    #[serde(flatten)]
    pub counts: TestCounts,
}

impl SubprojectSummary {
    /// Creates a summary, deriving the status from `counts`.
    pub fn new(name: String, counts: TestCounts, report_files: usize) -> Self {
        Self {
            name,
            status: counts.status(),
            report_files,
            counts,
        }
    }
}

/// The complete aggregated report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Per-subproject summaries, sorted by name.
    pub subprojects: Vec<SubprojectSummary>,
    /// Counters summed over every subproject.
    pub totals: TestCounts,
    /// Number of report files read.
    pub report_files: usize,
}

impl Report {
    /// True when any subproject has failures or errors.
    pub fn has_failures(&self) -> bool {
        self.subprojects.iter().any(|s| !s.status.is_pass())
    }
}
