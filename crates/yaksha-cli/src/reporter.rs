//! Run reporter - display what a recording session produced

use colored::*;
use yaksha_recorder::{OutputFiles, RecordedCase, RunSummary, SinkOutcome, TitleError};

/// Everything a finished session has to show
pub struct RunReport<'a> {
    pub summary: RunSummary,
    pub cases: &'a [RecordedCase],
    pub skipped: &'a [TitleError],
    pub outputs: &'a OutputFiles,
    pub sends: &'a [SinkOutcome],
}

/// Run reporter with output configuration
pub struct RunReporter {
    /// Show every recorded case
    verbose: bool,
    /// Disable colored output
    no_color: bool,
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RunReporter {
    /// Create a new run reporter
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            no_color: false,
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn report(&self, report: &RunReport<'_>) {
        if self.no_color {
            colored::control::set_override(false);
        }

        if self.verbose {
            for case in report.cases {
                self.print_case(case);
            }
            for reason in report.skipped {
                println!("{} {}", "SKIP".yellow().bold(), reason);
            }
            println!();
        }

        self.print_summary(report);

        if self.no_color {
            colored::control::unset_override();
        }
    }

    fn print_case(&self, case: &RecordedCase) {
        let label = if case.result.status.is_passed() {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "{} {} {}",
            label,
            case.identifier,
            format!("[{}]", case.category).dimmed()
        );
    }

    fn print_summary(&self, report: &RunReport<'_>) {
        let summary = report.summary;
        println!("{}", "─".repeat(50));

        println!(
            "Recorded: {} | {} passed, {} failed, {} skipped",
            summary.recorded.to_string().bold(),
            summary.passed.to_string().green().bold(),
            if summary.failed > 0 {
                summary.failed.to_string().red().bold()
            } else {
                summary.failed.to_string().normal()
            },
            if summary.skipped > 0 {
                summary.skipped.to_string().yellow().bold()
            } else {
                summary.skipped.to_string().normal()
            }
        );
        println!("Manifest: {}", report.outputs.manifest.display());
        println!("Log:      {}", report.outputs.combined_log.display());

        if !report.sends.is_empty() {
            let delivered = report.sends.iter().filter(|o| o.is_delivered()).count();
            let failed = report.sends.len() - delivered;
            println!(
                "Remote:   {} delivered, {} failed",
                delivered.to_string().green(),
                if failed > 0 {
                    failed.to_string().red().bold()
                } else {
                    failed.to_string().normal()
                }
            );
        }
    }
}

/// JSON form of a finished session
pub fn report_json(report: &RunReport<'_>) -> serde_json::Value {
    let cases: Vec<_> = report
        .cases
        .iter()
        .map(|case| {
            serde_json::json!({
                "identifier": case.identifier,
                "category": case.category.as_str(),
                "passed": case.result.status.is_passed(),
                "file": case.category_file.display().to_string(),
            })
        })
        .collect();
    let delivered = report.sends.iter().filter(|o| o.is_delivered()).count();

    serde_json::json!({
        "recorded": report.summary.recorded,
        "passed": report.summary.passed,
        "failed": report.summary.failed,
        "skipped": report.summary.skipped,
        "manifest": report.outputs.manifest.display().to_string(),
        "cases": cases,
        "remote": {
            "sent": report.sends.len(),
            "delivered": delivered,
        },
    })
}
