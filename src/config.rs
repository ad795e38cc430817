//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.test-summary.toml` files.

use crate::cli::OutputFormat;
use crate::junit::ParseStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the scan root.
pub const CONFIG_FILE_NAME: &str = ".test-summary.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Report parsing settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where to look for report files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Directory to scan.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob matched against each file path relative to `root`.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Directory names never descended into.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            pattern: default_pattern(),
            excludes: default_excludes(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Gradle's layout: `<subproject>/build/test-results/test/TEST-<class>.xml`.
pub fn default_pattern() -> String {
    "*/**/test-results/test/TEST-*.xml".to_string()
}

fn default_excludes() -> Vec<String> {
    vec![".git", ".gradle", ".idea", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// How counters are pulled out of each report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub strategy: ParseStrategy,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Add a Passed column to the table.
    #[serde(default)]
    pub show_passed: bool,

    /// Append a grand-total row to the table.
    #[serde(default)]
    pub show_totals: bool,

    /// Marker rendered for passing subprojects.
    #[serde(default = "default_pass_marker")]
    pub pass_marker: String,

    /// Marker rendered for failing subprojects.
    #[serde(default = "default_fail_marker")]
    pub fail_marker: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_passed: false,
            show_totals: false,
            pass_marker: default_pass_marker(),
            fail_marker: default_fail_marker(),
        }
    }
}

fn default_pass_marker() -> String {
    "✅".to_string()
}

fn default_fail_marker() -> String {
    "❌".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory (the scan root, typically).
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref root) = args.root {
            self.discovery.root = root.clone();
        }
        if let Some(ref pattern) = args.pattern {
            self.discovery.pattern = pattern.clone();
        }
        if let Some(ref excludes) = args.exclude {
            self.discovery.excludes = excludes.clone();
        }

        if let Some(strategy) = args.strategy {
            self.parser.strategy = strategy;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        // Flags only switch features on
        if args.show_passed {
            self.report.show_passed = true;
        }
        if args.totals {
            self.report.show_totals = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
