//! Report discovery.
//!
//! Walks the scan root and keeps every file whose root-relative path
//! matches the configured glob. The first path segment of each match names
//! the subproject it belongs to.

use crate::config::DiscoveryConfig;
use crate::error::{Result, SummaryError};
use crate::models::ReportFile;
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Group key used for reports placed directly in the scan root.
pub const ROOT_SUBPROJECT: &str = ".";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Configuration for report scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Glob matched against root-relative paths (e.g. `*/**/TEST-*.xml`)
    pub pattern: String,
    /// Directory names never descended into (e.g. [".git", "node_modules"])
    pub excludes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for ScanConfig {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            pattern: config.pattern.clone(),
            excludes: config.excludes.clone(),
        }
    }
}

/// Scanner locating report files under a root directory.
pub struct ReportScanner {
    root: PathBuf,
    config: ScanConfig,
    pattern: Pattern,
}

impl ReportScanner {
    /// Create a new scanner, compiling the configured pattern.
    pub fn new(root: PathBuf, config: ScanConfig) -> Result<Self> {
        let pattern = Pattern::new(&config.pattern).map_err(|source| SummaryError::Pattern {
            pattern: config.pattern.clone(),
            source,
        })?;

        Ok(Self {
            root,
            config,
            pattern,
        })
    }

    /// Scan for all matching report files, in path order.
    pub fn scan(&self) -> Result<Vec<ReportFile>> {
        let metadata = std::fs::metadata(&self.root).map_err(|source| SummaryError::Discovery {
            path: self.root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(SummaryError::Discovery {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
            });
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|err| SummaryError::Discovery {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone()),
                source: err.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(report) = self.matches(entry.path()) {
                trace!("Matched {}", report.relative_path);
                files.push(report);
            }
        }

        debug!(
            "Found {} report file(s) under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    /// Check a path against the pattern, returning its report location on a match.
    pub fn matches(&self, path: &Path) -> Option<ReportFile> {
        let segments = relative_segments(&self.root, path)?;
        let relative_path = segments.join("/");

        if !self.pattern.matches_with(&relative_path, MATCH_OPTIONS) {
            return None;
        }

        let subproject = if segments.len() > 1 {
            segments[0].clone()
        } else {
            ROOT_SUBPROJECT.to_string()
        };

        Some(ReportFile {
            path: path.to_path_buf(),
            relative_path,
            subproject,
        })
    }

    /// Check if a directory entry matches exclusion patterns.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

/// Splits `path` into its segments below `root`.
fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "<testsuite/>").unwrap();
    }

    fn scan(root: &Path, config: ScanConfig) -> Vec<ReportFile> {
        ReportScanner::new(root.to_path_buf(), config)
            .unwrap()
            .scan()
            .unwrap()
    }

    #[test]
    fn test_scan_gradle_layout() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "lib/build/test-results/test/TEST-b.xml");
        touch(temp_dir.path(), "lib/build/test-results/test/TEST-a.xml");
        touch(temp_dir.path(), "app/build/test-results/test/TEST-c.xml");
        touch(temp_dir.path(), "app/build/test-results/test/binary/output.bin");
        touch(temp_dir.path(), "app/build/reports/tests/TEST-c.xml");

        let files = scan(temp_dir.path(), ScanConfig::default());
        let relative: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();

        assert_eq!(
            relative,
            vec![
                "app/build/test-results/test/TEST-c.xml",
                "lib/build/test-results/test/TEST-a.xml",
                "lib/build/test-results/test/TEST-b.xml",
            ]
        );
        assert_eq!(files[0].subproject, "app");
        assert_eq!(files[1].subproject, "lib");
    }

    #[test]
    fn test_double_star_matches_zero_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "core/test-results/test/TEST-x.xml");

        let files = scan(temp_dir.path(), ScanConfig::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].subproject, "core");
    }

    #[test]
    fn test_single_star_does_not_cross_separator() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a/b/TEST-x.xml");

        let config = ScanConfig {
            pattern: "*/TEST-*.xml".to_string(),
            excludes: vec![],
        };
        assert!(scan(temp_dir.path(), config).is_empty());
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "node_modules/build/test-results/test/TEST-x.xml");
        touch(temp_dir.path(), "web/build/test-results/test/TEST-y.xml");

        let files = scan(temp_dir.path(), ScanConfig::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].subproject, "web");
    }

    #[test]
    fn test_file_in_root_uses_root_group() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "TEST-top.xml");

        let config = ScanConfig {
            pattern: "**/TEST-*.xml".to_string(),
            excludes: vec![],
        };
        let files = scan(temp_dir.path(), config);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].subproject, ROOT_SUBPROJECT);
    }

    #[test]
    fn test_empty_root_finds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan(temp_dir.path(), ScanConfig::default()).is_empty());
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = ReportScanner::new(missing.clone(), ScanConfig::default())
            .unwrap()
            .scan()
            .unwrap_err();
        match err {
            SummaryError::Discovery { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_that_is_a_file_is_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let err = ReportScanner::new(file, ScanConfig::default())
            .unwrap()
            .scan()
            .unwrap_err();
        assert!(matches!(err, SummaryError::Discovery { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = ScanConfig {
            pattern: "[unclosed".to_string(),
            excludes: vec![],
        };
        let err = ReportScanner::new(PathBuf::from("."), config).err().unwrap();
        assert!(matches!(err, SummaryError::Pattern { .. }));
    }
}
