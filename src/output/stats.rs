//! Console summary of a freeze run

use crate::output::FreezeReport;
use crate::state::TaskState;

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &FreezeReport) {
    println!("=== Freeze Report ===\n");

    println!("Overview:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!(
        "  Duration: {:.2}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  Tasks recorded: {}", report.records.len());
    println!("  Duplicates dropped: {}", report.deduplicated);
    println!();

    println!("Tasks by State:");
    for state in TaskState::terminal_states() {
        println!("  {}: {}", state, report.count(state));
    }
    println!();

    if report.has_failures() {
        println!("Failures:");
        for record in report.failures() {
            println!(
                "  - {}: {}",
                record.url,
                record.detail.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }

    let skipped: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.state == TaskState::SkippedNonOk)
        .collect();
    if !skipped.is_empty() {
        println!("Skipped (non-2xx):");
        for record in skipped {
            let status = record
                .http_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  - {} ({})", record.url, status);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} pages written)",
        report.success_rate(),
        report.written_count()
    );
}
