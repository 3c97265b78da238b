//! Invite flow: make sure every roster student is a member or has a pending
//! invitation.

use onboarding::{
    plan_invitations, OnboardingError, OrgDirectory, OrgName, OrgRole, Roster, RunReport,
};
use tracing::{info, instrument};

use crate::apply::{apply_plan, ApplySettings};
use crate::snapshot;

/// Options for [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteOptions {
    /// Compute and report the plan without mutating calls.
    pub dry_run: bool,
    /// Role granted by the invitations.
    pub role: OrgRole,
}

/// Runs the invite flow.
///
/// Steps: check org access, read members and pending invitations, plan, then
/// (unless dry-run) resolve each new username and invite it. Failures on a
/// single user are collected in the report; authorization failures abort.
#[instrument(skip_all, fields(org = %org, students = roster.len(), dry_run = options.dry_run))]
pub async fn run(
    directory: &dyn OrgDirectory,
    org: &OrgName,
    roster: &Roster,
    options: &InviteOptions,
) -> Result<RunReport, OnboardingError> {
    let mut report = RunReport::new(options.dry_run);

    snapshot::check_access(directory, org).await?;
    let observed = snapshot::fetch_membership(directory, org).await?;

    report.plan = plan_invitations(roster, &observed);
    info!(
        invites = report.plan.operations.len(),
        skipped = report.plan.skipped.len(),
        "Invitation plan computed"
    );

    if !options.dry_run {
        let settings = ApplySettings {
            invite_role: options.role,
            ..ApplySettings::default()
        };
        apply_plan(directory, org, &settings, &mut report).await?;
    }

    Ok(report.finish())
}
