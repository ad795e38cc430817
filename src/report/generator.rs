//! Summary rendering.
//!
//! This module renders the aggregated report as a `|`-delimited table, a
//! one-line total or JSON. Rendering is pure: the whole output is built in
//! memory before anything is written.

use crate::cli::OutputFormat;
use crate::config::ReportConfig;
use crate::models::{Report, Status, TestCounts};
use anyhow::Result;
use std::io::Write;
use unicode_width::UnicodeWidthStr;

/// Label of the grand-total row.
const TOTAL_LABEL: &str = "**Total**";

/// Presentation settings for the table.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Add a Passed column.
    pub show_passed: bool,
    /// Append a grand-total row.
    pub show_totals: bool,
    /// Marker for passing rows.
    pub pass_marker: String,
    /// Marker for failing rows.
    pub fail_marker: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for RenderOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            show_passed: config.show_passed,
            show_totals: config.show_totals,
            pass_marker: config.pass_marker.clone(),
            fail_marker: config.fail_marker.clone(),
        }
    }
}

impl RenderOptions {
    fn marker(&self, status: Status) -> &str {
        match status {
            Status::Pass => self.pass_marker.as_str(),
            Status::Fail => self.fail_marker.as_str(),
        }
    }
}

/// Render the report in the requested format.
pub fn render(report: &Report, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(generate_table(report, options)),
        OutputFormat::Total => Ok(generate_total_line(report)),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Generate the per-subproject table.
pub fn generate_table(report: &Report, options: &RenderOptions) -> String {
    let mut headers = vec!["Subproject", "Status", "Tests"];
    if options.show_passed {
        headers.push("Passed");
    }
    headers.extend(["Skipped", "Failures", "Errors"]);

    let mut rows: Vec<Vec<String>> = report
        .subprojects
        .iter()
        .map(|summary| table_row(&summary.name, summary.status, &summary.counts, options))
        .collect();

    if options.show_totals {
        rows.push(table_row(
            TOTAL_LABEL,
            report.totals.status(),
            &report.totals,
            options,
        ));
    }

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut table = String::new();

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    table.push_str(&format_row(&header_cells, &widths));
    table.push_str(&separator_row(&widths));

    for row in &rows {
        table.push_str(&format_row(row, &widths));
    }

    table
}

fn table_row(
    name: &str,
    status: Status,
    counts: &TestCounts,
    options: &RenderOptions,
) -> Vec<String> {
    let mut row = vec![
        name.to_string(),
        options.marker(status).to_string(),
        counts.tests.to_string(),
    ];
    if options.show_passed {
        row.push(counts.passed.to_string());
    }
    row.push(counts.skipped.to_string());
    row.push(counts.failures.to_string());
    row.push(counts.errors.to_string());
    row
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            // Pad by terminal columns; status markers are double-width
            let padding = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(padding))
        })
        .collect();

    format!("| {} |\n", padded.join(" | "))
}

/// First column left-aligned, the rest centred.
fn separator_row(widths: &[usize]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            if i == 0 {
                "-".repeat(width + 2)
            } else {
                format!(":{}:", "-".repeat(*width))
            }
        })
        .collect();

    format!("|{}|\n", cells.join("|"))
}

/// Generate the single-sentence total.
pub fn generate_total_line(report: &Report) -> String {
    format!("There were {} test(s).\n", report.totals.tests)
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Write rendered output in one call.
pub fn write_output(out: &mut impl Write, rendered: &str) -> Result<()> {
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;

    fn create_test_report() -> Report {
        aggregate(vec![
            ("lib".to_string(), TestCounts::from_declared(42, 1, 0, 0)),
            ("app".to_string(), TestCounts::from_declared(10, 0, 0, 0)),
            ("app".to_string(), TestCounts::from_declared(5, 0, 1, 0)),
        ])
    }

    #[test]
    fn test_generate_table_single_row() {
        let report = aggregate(vec![(
            "lib".to_string(),
            TestCounts::from_declared(42, 1, 0, 0),
        )]);
        let table = generate_table(&report, &RenderOptions::default());

        let expected = "\
| Subproject | Status | Tests | Skipped | Failures | Errors |
|------------|:------:|:-----:|:-------:|:--------:|:------:|
| lib        | ✅     | 42    | 1       | 0        | 0      |
";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_generate_table_marks_failures() {
        let table = generate_table(&create_test_report(), &RenderOptions::default());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("| app "));
        assert!(lines[2].contains("❌"));
        assert!(lines[2].contains("| 15 "));
        assert!(lines[3].starts_with("| lib "));
        assert!(lines[3].contains("✅"));
    }

    #[test]
    fn test_generate_table_with_passed_and_totals() {
        let options = RenderOptions {
            show_passed: true,
            show_totals: true,
            pass_marker: "pass".to_string(),
            fail_marker: "fail".to_string(),
        };
        let table = generate_table(&create_test_report(), &options);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(
            lines[0],
            "| Subproject | Status | Tests | Passed | Skipped | Failures | Errors |"
        );
        assert_eq!(
            lines[4],
            "| **Total**  | fail   | 57    | 55     | 1       | 1        | 0      |"
        );
    }

    #[test]
    fn test_column_widens_for_long_names() {
        let report = aggregate(vec![(
            "integration-tests".to_string(),
            TestCounts::from_declared(1, 0, 0, 0),
        )]);
        let table = generate_table(&report, &RenderOptions::default());
        let lines: Vec<_> = table.lines().collect();

        assert!(lines[0].starts_with("| Subproject        | Status |"));
        assert!(lines[1].starts_with("|-------------------|:------:|"));
        assert!(lines[2].starts_with("| integration-tests | ✅     |"));
    }

    #[test]
    fn test_wide_markers_keep_columns_aligned() {
        let table = generate_table(&create_test_report(), &RenderOptions::default());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(
            lines[2],
            "| app        | ❌     | 15    | 0       | 1        | 0      |"
        );
        let widths: Vec<usize> = lines.iter().map(|line| line.width()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn test_empty_report_renders_header_only() {
        let report = aggregate(Vec::new());
        let table = generate_table(&report, &RenderOptions::default());
        assert_eq!(table.lines().count(), 2);

        assert_eq!(generate_total_line(&report), "There were 0 test(s).\n");
    }

    #[test]
    fn test_generate_total_line() {
        assert_eq!(
            generate_total_line(&create_test_report()),
            "There were 57 test(s).\n"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let options = RenderOptions::default();
        let first = render(&create_test_report(), OutputFormat::Table, &options).unwrap();
        let second = render(&create_test_report(), OutputFormat::Table, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["subprojects"][0]["name"], "app");
        assert_eq!(value["subprojects"][0]["status"], "fail");
        assert_eq!(value["totals"]["tests"], 57);
        assert_eq!(value["report_files"], 3);
    }

    #[test]
    fn test_write_output() {
        let mut buffer = Vec::new();
        write_output(&mut buffer, "There were 1 test(s).\n").unwrap();
        assert_eq!(buffer, b"There were 1 test(s).\n");
    }
}
