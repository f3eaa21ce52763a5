//! Task report output

use serde::Serialize;
use soul_tasks::{TaskReport, TaskStatus};

/// One-line human summary of a finished task
pub fn summary_line(report: &TaskReport) -> String {
    let mut line = format!(
        "{} #{} {} {}",
        report.finished_at.format("%H:%M:%S"),
        report.id,
        report.kind,
        status_label(report.status)
    );
    if let Some(message) = &report.message {
        line.push_str(": ");
        line.push_str(message);
    }
    if let Some(error) = &report.error {
        line.push_str(" [");
        line.push_str(error);
        line.push(']');
    }
    line
}

fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Running => "running",
        TaskStatus::Succeeded => "ok",
        TaskStatus::SucceededWithWarnings => "ok with warnings",
        TaskStatus::Failed => "FAILED",
        TaskStatus::Superseded => "superseded",
        TaskStatus::Cancelled => "cancelled",
    }
}

/// Totals over a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tasks: usize,
    pub failed_tasks: usize,
    pub items_succeeded: usize,
    pub items_skipped: usize,
    pub items_failed: usize,
}

impl RunSummary {
    pub fn of(reports: &[TaskReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.tasks += 1;
            if report.status == TaskStatus::Failed {
                summary.failed_tasks += 1;
            }
            summary.items_succeeded += report.tally.succeeded;
            summary.items_skipped += report.tally.skipped;
            summary.items_failed += report.tally.failed;
            summary
        })
    }
}

/// Print one report as text or as a JSON line
pub fn print_report(report: &TaskReport, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{}", summary_line(report));
    }
    Ok(())
}

/// Print reports followed by their totals
pub fn print_reports(reports: &[TaskReport], json: bool) -> serde_json::Result<()> {
    for report in reports {
        print_report(report, json)?;
    }

    let summary = RunSummary::of(reports);
    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "{} tasks, {} failed; items: {} ok, {} skipped, {} failed",
            summary.tasks,
            summary.failed_tasks,
            summary.items_succeeded,
            summary.items_skipped,
            summary.items_failed
        );
    }
    Ok(())
}
