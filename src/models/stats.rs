//! Per-run statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Every identifier in the range was visited.
    #[default]
    Completed,
    /// Stopped early by a cancellation request.
    Interrupted,
}

/// One failed identifier and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub identifier: String,
    pub reason: String,
}

/// Counters and failures accumulated by one driver run.
///
/// `attempted == succeeded + failed + skipped` holds after every recorded item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Not found at the source, or found without an image.
    pub skipped: u64,
    /// Failures in the order they happened.
    pub failures: Vec<Failure>,
    pub outcome: RunOutcome,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.attempted += 1;
        self.skipped += 1;
    }

    pub fn record_failure<I: Into<String>, R: Into<String>>(&mut self, identifier: I, reason: R) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(Failure {
            identifier: identifier.into(),
            reason: reason.into(),
        });
    }

    pub fn is_interrupted(&self) -> bool {
        self.outcome == RunOutcome::Interrupted
    }

    /// Whether the counters add up.
    pub fn is_consistent(&self) -> bool {
        self.attempted == self.succeeded + self.failed + self.skipped
            && self.failed == self.failures.len() as u64
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "EXTRACTION SUMMARY")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(
            f,
            "Status:    {}",
            match self.outcome {
                RunOutcome::Completed => "completed",
                RunOutcome::Interrupted => "interrupted",
            }
        )?;
        writeln!(f, "Attempted: {}", self.attempted)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed:    {}", self.failed)?;
        write!(f, "Skipped:   {}", self.skipped)?;
        if !self.failures.is_empty() {
            write!(f, "\nFailures:")?;
            for failure in &self.failures {
                write!(f, "\n  - [{}] {}", failure.identifier, failure.reason)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_stay_consistent() {
        let mut stats = RunStatistics::new();
        stats.record_success();
        stats.record_skip();
        stats.record_skip();
        stats.record_failure("4", "HTTP 500 from https://example.org/4");

        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.failed, 1);
        assert!(stats.is_consistent());
        assert_eq!(stats.failures[0].identifier, "4");
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut stats = RunStatistics::new();
        stats.record_success();
        stats.record_failure("9", "timeout");
        stats.outcome = RunOutcome::Interrupted;

        let text = stats.to_string();
        assert!(text.contains("Status:    interrupted"));
        assert!(text.contains("Attempted: 2"));
        assert!(text.contains("Succeeded: 1"));
        assert!(text.contains("  - [9] timeout"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut stats = RunStatistics::new();
        stats.record_skip();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["outcome"], "completed");
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
