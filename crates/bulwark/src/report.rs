//! Reporting sinks for attack timelines.
//!
//! Sinks only observe a finished [`AttackReport`]; they never touch engine
//! state.

use std::path::PathBuf;

use bulwark_common::{AttackOutcome, AttackReport, BulwarkError};

/// Receives the attempts, rate-limit and lockout timelines of a run
pub trait ReportSink {
    fn publish(&mut self, report: &AttackReport) -> Result<(), BulwarkError>;
}

/// Writes the report as JSON, ready for external plotting
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonReportSink {
    fn publish(&mut self, report: &AttackReport) -> Result<(), BulwarkError> {
        let data = serde_json::to_string_pretty(report)
            .map_err(|e| BulwarkError::Report(format!("failed to encode report: {}", e)))?;
        std::fs::write(&self.path, data).map_err(|e| {
            BulwarkError::Report(format!("failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::info!(path = %self.path.display(), "Attack report written");
        Ok(())
    }
}

/// Prints a text summary of the run to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSummary;

impl ConsoleSummary {
    pub fn render(report: &AttackReport) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nBrute Force Attack Progress: {}\n", report.target));
        out.push_str(&format!("{}\n", "=".repeat(50)));

        if report.attempts.is_empty() {
            out.push_str("No attempts recorded\n");
            return out;
        }

        let duration = report.attempts.last().map_or(0.0, |a| a.elapsed_secs);
        out.push_str(&format!(
            "Attempts: {}  Rate limited: {}  Locked out: {}  Duration: {:.1}s\n",
            report.attempts.len(),
            report.rate_limits.len(),
            report.lockouts.len(),
            duration
        ));

        for point in &report.rate_limits {
            out.push_str(&format!(
                "  [{:>8.1}s] rate limited at attempt {}\n",
                point.elapsed_secs, point.attempt_index
            ));
        }
        for point in &report.lockouts {
            out.push_str(&format!(
                "  [{:>8.1}s] locked out at attempt {}\n",
                point.elapsed_secs, point.attempt_index
            ));
        }

        let outcome = match &report.outcome {
            AttackOutcome::Found { password } => format!("password found: {}", password),
            AttackOutcome::Exhausted => "candidate list exhausted".to_string(),
            AttackOutcome::Cancelled => "cancelled".to_string(),
        };
        out.push_str(&format!("Outcome: {}\n", outcome));
        out
    }
}

impl ReportSink for ConsoleSummary {
    fn publish(&mut self, report: &AttackReport) -> Result<(), BulwarkError> {
        print!("{}", Self::render(report));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_common::TimelinePoint;

    fn sample() -> AttackReport {
        let mut report = AttackReport::new("admin".to_string());
        report.attempts = vec![
            TimelinePoint { elapsed_secs: 0.0, attempt_index: 1 },
            TimelinePoint { elapsed_secs: 0.5, attempt_index: 2 },
            TimelinePoint { elapsed_secs: 31.0, attempt_index: 3 },
        ];
        report.lockouts = vec![TimelinePoint { elapsed_secs: 0.5, attempt_index: 2 }];
        report.outcome = AttackOutcome::Found {
            password: "admin123".to_string(),
        };
        report
    }

    #[test]
    fn test_json_sink_writes_all_timelines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample();

        JsonReportSink::new(&path).publish(&report).unwrap();

        let written: AttackReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report);
    }

    #[test]
    fn test_console_summary_counts() {
        let text = ConsoleSummary::render(&sample());
        assert!(text.contains("Attempts: 3  Rate limited: 0  Locked out: 1  Duration: 31.0s"));
        assert!(text.contains("locked out at attempt 2"));
        assert!(text.contains("Outcome: password found: admin123"));
    }

    #[test]
    fn test_console_summary_without_attempts() {
        let report = AttackReport::new("ghost".to_string());
        assert!(ConsoleSummary::render(&report).contains("No attempts recorded"));
    }
}
