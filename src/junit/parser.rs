//! Streaming extraction of test counters from a JUnit XML document.

use super::ParseStrategy;
use crate::error::{Result, SummaryError};
use crate::models::TestCounts;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Counter attributes declared on a `testsuite` element.
const COUNTER_ATTRIBUTES: [&str; 4] = ["tests", "skipped", "failures", "errors"];

const ROOT_ELEMENTS: [&str; 2] = ["testsuite", "testsuites"];

/// Read and parse one report file.
///
/// The file is read into memory and closed before parsing starts.
pub fn parse_report(path: &Path, strategy: ParseStrategy) -> Result<TestCounts> {
    let content = fs::read_to_string(path).map_err(|source| SummaryError::ReportRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_report_str(&content, path, strategy)
}

/// Parse report content; `path` is only used in diagnostics.
pub fn parse_report_str(content: &str, path: &Path, strategy: ParseStrategy) -> Result<TestCounts> {
    let document = Document::read(content, path)?;

    match strategy {
        ParseStrategy::Attributes => document.declared_counts(path),
        ParseStrategy::Elements => Ok(document.counted),
        ParseStrategy::Auto => {
            // Malformed counters are an error even when we could fall back
            for field in COUNTER_ATTRIBUTES {
                if let Some(value) = document.root_attributes.get(field) {
                    parse_count(path, field, value)?;
                }
            }

            if document.declares_all_counters() {
                document.declared_counts(path)
            } else {
                debug!(
                    "{} does not declare all counters on <{}>, counting test cases",
                    path.display(),
                    document.root_name
                );
                Ok(document.counted)
            }
        }
    }
}

/// What a single pass over the document collects.
#[derive(Debug)]
struct Document {
    root_name: String,
    root_attributes: BTreeMap<String, String>,
    counted: TestCounts,
}

impl Document {
    fn read(content: &str, path: &Path) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut depth = 0usize;
        let mut root: Option<(String, BTreeMap<String, String>)> = None;
        let mut cases = CaseCounter::default();

        loop {
            let event = reader.read_event().map_err(|err| {
                SummaryError::parse(
                    path,
                    format!("{} (at byte {})", err, reader.buffer_position()),
                )
            })?;

            match event {
                Event::Start(element) => {
                    let name = local_name(&element);
                    if depth == 0 {
                        root = Some(read_root(&element, &name, root.is_some(), path)?);
                    }
                    cases.open(&name, depth);
                    depth += 1;
                }
                Event::Empty(element) => {
                    let name = local_name(&element);
                    if depth == 0 {
                        root = Some(read_root(&element, &name, root.is_some(), path)?);
                    }
                    cases.open(&name, depth);
                    cases.close(&name, depth);
                }
                Event::End(element) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| SummaryError::parse(path, "unbalanced closing tag"))?;
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    cases.close(&name, depth);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(SummaryError::parse(path, "unexpected end of document"));
        }

        let (root_name, root_attributes) =
            root.ok_or_else(|| SummaryError::parse(path, "no root element"))?;

        Ok(Self {
            root_name,
            root_attributes,
            counted: cases.counts,
        })
    }

    fn declares_all_counters(&self) -> bool {
        COUNTER_ATTRIBUTES
            .iter()
            .all(|field| self.root_attributes.contains_key(*field))
    }

    fn declared_counts(&self, path: &Path) -> Result<TestCounts> {
        let mut values = [0u64; 4];
        for (slot, field) in values.iter_mut().zip(COUNTER_ATTRIBUTES) {
            let value = self.root_attributes.get(field).ok_or_else(|| {
                SummaryError::parse(
                    path,
                    format!("missing '{}' attribute on <{}>", field, self.root_name),
                )
            })?;
            *slot = parse_count(path, field, value)?;
        }

        let [tests, skipped, failures, errors] = values;
        let counts = TestCounts::from_declared(tests, skipped, failures, errors);
        if counts.is_inconsistent() {
            warn!(
                "{} declares more skipped/failed/errored cases than tests ({})",
                path.display(),
                tests
            );
        }
        Ok(counts)
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn read_root(
    element: &BytesStart<'_>,
    name: &str,
    seen_root: bool,
    path: &Path,
) -> Result<(String, BTreeMap<String, String>)> {
    if seen_root {
        return Err(SummaryError::parse(path, "multiple root elements"));
    }
    if !ROOT_ELEMENTS.contains(&name) {
        return Err(SummaryError::parse(
            path,
            format!("unexpected root element <{}>", name),
        ));
    }

    let mut attributes = BTreeMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| SummaryError::parse(path, err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| SummaryError::parse(path, err.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok((name.to_string(), attributes))
}

fn parse_count(path: &Path, field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| SummaryError::CountParse {
            path: path.to_path_buf(),
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Counts `testcase` elements and the outcome markers directly inside them.
#[derive(Debug, Default)]
struct CaseCounter {
    open_case: Option<OpenCase>,
    counts: TestCounts,
}

#[derive(Debug)]
struct OpenCase {
    depth: usize,
    failure: bool,
    error: bool,
    skipped: bool,
}

impl CaseCounter {
    fn open(&mut self, name: &str, depth: usize) {
        let Some(case) = self.open_case.as_mut() else {
            if name == "testcase" {
                self.open_case = Some(OpenCase {
                    depth,
                    failure: false,
                    error: false,
                    skipped: false,
                });
            }
            return;
        };

        if depth != case.depth + 1 {
            return;
        }
        match name {
            "failure" => case.failure = true,
            "error" => case.error = true,
            "skipped" => case.skipped = true,
            _ => {}
        }
    }

    fn close(&mut self, name: &str, depth: usize) {
        let closes_case = matches!(&self.open_case, Some(case) if name == "testcase" && case.depth == depth);
        if !closes_case {
            return;
        }

        if let Some(case) = self.open_case.take() {
            self.counts.tests += 1;
            if case.failure {
                self.counts.failures += 1;
            }
            if case.error {
                self.counts.errors += 1;
            }
            if case.skipped {
                self.counts.skipped += 1;
            }
            if !(case.failure || case.error || case.skipped) {
                self.counts.passed += 1;
            }
        }
    }
}
