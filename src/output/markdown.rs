//! Markdown report generation
//!
//! This module renders a freeze report as a human-readable markdown document:
//! run metadata, a state breakdown, and tables of written, skipped and failed
//! URLs.

use crate::output::FreezeReport;
use crate::state::TaskState;
use crate::OutputError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report to `output_path`
pub fn write_markdown_report(report: &FreezeReport, output_path: &Path) -> Result<(), OutputError> {
    let markdown = format_markdown_report(report);

    let write_err = |source| OutputError::Write {
        path: output_path.to_path_buf(),
        source,
    };
    let mut file = File::create(output_path).map_err(write_err)?;
    file.write_all(markdown.as_bytes()).map_err(write_err)?;

    Ok(())
}

/// Formats a freeze report as markdown
pub fn format_markdown_report(report: &FreezeReport) -> String {
    let mut md = String::new();

    md.push_str("# Site-Freezer Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.duration().num_milliseconds() as f64 / 1000.0
    ));
    md.push_str(&format!("- **Duplicates Dropped**: {}\n", report.deduplicated));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    // State breakdown
    md.push_str("## Task State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in TaskState::terminal_states() {
        md.push_str(&format!("| {} | {} |\n", state, report.count(state)));
    }
    md.push('\n');

    if report.written_count() > 0 {
        md.push_str("## Written Pages\n\n");
        md.push_str("| URL | File | SHA-256 |\n");
        md.push_str("|-----|------|---------|\n");
        for record in report.written() {
            let path = record
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                record.url,
                path,
                record.digest.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
    }

    let skipped: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.state.is_skipped())
        .collect();
    if !skipped.is_empty() {
        md.push_str("## Skipped\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for record in skipped {
            let reason = match (record.state, record.http_status) {
                (TaskState::SkippedNonOk, Some(status)) => format!("status {}", status),
                (TaskState::SkippedExternal, _) => "external".to_string(),
                _ => record.state.to_string(),
            };
            md.push_str(&format!("| {} | {} |\n", record.url, reason));
        }
        md.push('\n');
    }

    if report.has_failures() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for record in report.failures() {
            md.push_str(&format!(
                "| {} | {} |\n",
                record.url,
                record.detail.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
    }

    md
}
