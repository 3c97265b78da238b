//! Human-readable run output on stdout.

use std::io::{self, Write};

use onboarding::RunReport;

/// Writes every planned or applied operation, every skip, every failure, and
/// the closing summary line.
pub fn write_report(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    if report.dry_run {
        for op in &report.plan.operations {
            writeln!(out, "[DRY] would {op}")?;
        }
    } else {
        for op in &report.applied {
            writeln!(out, "[OK] {op}")?;
        }
    }

    for skipped in &report.plan.skipped {
        writeln!(out, "[SKIP] {}: {}", skipped.subject, skipped.reason)?;
    }
    for failure in &report.failures {
        writeln!(out, "[FAIL] {failure}")?;
    }

    writeln!(out, "Summary: {}", report.summary())
}

#[cfg(test)]
mod tests {
    use onboarding::{OnboardingError, Operation, SkipReason, Skipped, Username};
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(report: &RunReport) -> String {
        let mut out = Vec::new();
        write_report(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report(dry_run: bool) -> RunReport {
        let mut report = RunReport::new(dry_run);
        report.plan.operations.push(Operation::Invite {
            username: Username::parse("alice").unwrap(),
        });
        report.plan.skipped.push(Skipped {
            subject: "bob".to_string(),
            reason: SkipReason::AlreadyMember,
        });
        report
    }

    #[test]
    fn dry_run_lists_planned_operations() {
        assert_eq!(
            render(&report(true)),
            "[DRY] would invite alice\n\
             [SKIP] bob: already a member\n\
             Summary: ok=1 skip=1 fail=0\n"
        );
    }

    #[test]
    fn real_run_lists_applied_operations_and_failures() {
        let mut report = report(false);
        report.plan.operations.push(Operation::Invite {
            username: Username::parse("ghost").unwrap(),
        });
        report.applied.push(report.plan.operations[0].clone());
        report
            .failures
            .push(OnboardingError::item("invite", "ghost", "Not Found"));

        assert_eq!(
            render(&report),
            "[OK] invite alice\n\
             [SKIP] bob: already a member\n\
             [FAIL] invite failed for ghost: Not Found\n\
             Summary: ok=1 skip=1 fail=1\n"
        );
    }
}
