//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::junit::ParseStrategy;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// test-summary - per-subproject summary of JUnit XML test reports
///
/// Scans a multi-project build for test report files, sums the counts of
/// every report belonging to the same subproject and prints one table row
/// per subproject.
///
/// Examples:
///   test-summary
///   test-summary --root ../my-build --show-passed --totals
///   test-summary --pattern "*/**/surefire-reports/TEST-*.xml"
///   test-summary --format total
///   test-summary --dry-run
///   test-summary --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory to scan for report files
    ///
    /// Defaults to the current directory or `discovery.root` from the config file.
    #[arg(short, long, value_name = "DIR", env = "TEST_SUMMARY_ROOT")]
    pub root: Option<PathBuf>,

    /// Glob matched against report paths relative to the root
    ///
    /// The first path segment of every match names its subproject.
    /// Default: */**/test-results/test/TEST-*.xml
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Directory names to skip while scanning (comma-separated)
    #[arg(long, value_name = "DIRS", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Output format (table, total, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// How counts are extracted from each report (auto, attributes, elements)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<ParseStrategy>,

    /// Add a Passed column to the table
    #[arg(long)]
    pub show_passed: bool,

    /// Append a grand-total row to the table
    #[arg(long)]
    pub totals: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .test-summary.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 when any subproject has failures or errors
    #[arg(long)]
    pub fail_on_failure: bool,

    /// List the report files that would be read, grouped by subproject
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .test-summary.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown-style table, one row per subproject (default)
    #[default]
    Table,
    /// Single line with the grand total of tests
    Total,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref pattern) = self.pattern {
            if pattern.trim().is_empty() {
                return Err("Report pattern must not be empty".to_string());
            }
        }

        // A missing root is reported by discovery; only reject obvious misuse here
        if let Some(ref root) = self.root {
            if root.exists() && !root.is_dir() {
                return Err(format!("Root path is not a directory: {}", root.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
