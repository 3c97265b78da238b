//! Outcome of one synchronizer run.

use serde::{Deserialize, Serialize};

use crate::{OnboardingError, Operation, Plan, Timestamp};

/// Everything a flow did (or, in dry-run, would do).
///
/// Per-item failures end up in [`RunReport::failures`] instead of aborting
/// the run; the caller decides whether they affect the exit status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether mutating calls were suppressed.
    pub dry_run: bool,
    /// The computed difference between desired and observed state.
    pub plan: Plan,
    /// Operations that succeeded. Always empty in dry-run.
    pub applied: Vec<Operation>,
    /// Item-level errors (`MissingGroup`, `ApiItem`) in the order they occurred.
    pub failures: Vec<OnboardingError>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl RunReport {
    /// Starts an empty report.
    pub fn new(dry_run: bool) -> Self {
        let now = Timestamp::now();
        Self {
            dry_run,
            plan: Plan::default(),
            applied: Vec::new(),
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Stamps the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Timestamp::now();
        self
    }

    /// Returns `true` if any item failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Counts for the final summary line.
    ///
    /// In dry-run, planned operations count as `ok` since they are what a real
    /// run would attempt.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            ok: if self.dry_run {
                self.plan.operations.len()
            } else {
                self.applied.len()
            },
            skipped: self.plan.skipped.len(),
            failed: self.failures.len(),
        }
    }
}

/// Aggregate counts of a [`RunReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub ok: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ok={} skip={} fail={}",
            self.ok, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SkipReason, Skipped, Username};

    #[test]
    fn summary_counts_planned_operations_in_dry_run() {
        let mut report = RunReport::new(true);
        report.plan.operations.push(Operation::Invite {
            username: Username::parse("alice").unwrap(),
        });
        report.plan.skipped.push(Skipped {
            subject: "bob".to_string(),
            reason: SkipReason::AlreadyMember,
        });

        assert_eq!(report.summary().to_string(), "ok=1 skip=1 fail=0");
        assert!(!report.has_failures());
    }

    #[test]
    fn summary_counts_applied_operations_in_real_run() {
        let mut report = RunReport::new(false);
        report.plan.operations.push(Operation::Invite {
            username: Username::parse("alice").unwrap(),
        });
        report
            .failures
            .push(OnboardingError::item("invite", "alice", "Not Found"));

        let report = report.finish();
        assert_eq!(report.summary().to_string(), "ok=0 skip=0 fail=1");
        assert!(report.has_failures());
        assert!(report.finished_at >= report.started_at);
    }
}
