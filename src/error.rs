//! Error types for report discovery and parsing.
//!
//! Every error carries the path it concerns so the diagnostic printed by
//! `main` points at the offending file or directory.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading or parsing test reports.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The scan root is missing, not a directory, or could not be walked.
    #[error("cannot scan {}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured report pattern is not a valid glob.
    #[error("invalid report pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A discovered report file could not be read.
    #[error("cannot read report {}", .path.display())]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report file is not a usable JUnit XML document.
    #[error("malformed report {}: {message}", .path.display())]
    ReportParse { path: PathBuf, message: String },

    /// A counter attribute is not a non-negative integer.
    #[error("invalid '{field}' count '{value}' in {}", .path.display())]
    CountParse {
        path: PathBuf,
        field: String,
        value: String,
    },
}

impl SummaryError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SummaryError::ReportParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;
