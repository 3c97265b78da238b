//! Reading organization state through the port.
//!
//! Every failure here is fatal: without a complete snapshot the planner could
//! issue duplicate invitations or team creations.

use std::collections::HashSet;

use onboarding::{
    DesiredTeam, DirectoryErrorKind, MembershipSnapshot, ObservedTeam, OnboardingError,
    OrgDirectory, OrgName, TeamRole, TeamsSnapshot,
};
use tracing::{debug, instrument};

/// Verifies the organization is reachable with the configured credentials.
///
/// A missing organization is reported as an authorization failure: GitHub
/// answers 404 both for unknown orgs and for orgs the token cannot see.
#[instrument(skip_all, fields(org = %org))]
pub async fn check_access(
    directory: &dyn OrgDirectory,
    org: &OrgName,
) -> Result<(), OnboardingError> {
    directory.check_org(org).await.map_err(|err| {
        if err.kind == DirectoryErrorKind::NotFound {
            OnboardingError::ApiAuth {
                message: format!("organization '{org}' not found or not accessible"),
            }
        } else {
            OnboardingError::from_snapshot_failure("check organization", err)
        }
    })
}

/// Fetches current members and pending invitations.
#[instrument(skip_all, fields(org = %org))]
pub async fn fetch_membership(
    directory: &dyn OrgDirectory,
    org: &OrgName,
) -> Result<MembershipSnapshot, OnboardingError> {
    let members = directory
        .list_members(org)
        .await
        .map_err(|e| OnboardingError::from_snapshot_failure("list members", e))?;
    let invitations = directory
        .list_pending_invitations(org)
        .await
        .map_err(|e| OnboardingError::from_snapshot_failure("list invitations", e))?;

    debug!(
        members = members.len(),
        invitations = invitations.len(),
        "Membership snapshot fetched"
    );
    Ok(MembershipSnapshot::new(members, invitations))
}

/// Fetches all teams, plus member roles for the teams in `desired` that
/// already exist.
#[instrument(skip_all, fields(org = %org, desired = desired.len()))]
pub async fn fetch_teams(
    directory: &dyn OrgDirectory,
    org: &OrgName,
    desired: &[DesiredTeam],
) -> Result<TeamsSnapshot, OnboardingError> {
    let summaries = directory
        .list_teams(org)
        .await
        .map_err(|e| OnboardingError::from_snapshot_failure("list teams", e))?;

    let mut snapshot = TeamsSnapshot {
        teams: summaries
            .into_iter()
            .map(|summary| ObservedTeam {
                summary,
                roles: Default::default(),
            })
            .collect(),
    };

    let mut wanted = HashSet::new();
    for team in desired {
        if let Some(existing) = snapshot.find(team) {
            wanted.insert(existing.summary.slug.clone());
        }
    }

    for team in snapshot.teams.iter_mut() {
        if !wanted.contains(&team.summary.slug) {
            continue;
        }
        let slug = &team.summary.slug;

        // Maintainers first so a member listing can never downgrade them.
        for role in [TeamRole::Maintainer, TeamRole::Member] {
            let users = directory
                .list_team_members(org, slug, role)
                .await
                .map_err(|e| OnboardingError::from_snapshot_failure("list team members", e))?;
            for username in users {
                team.roles.entry(username).or_insert(role);
            }
        }
        debug!(team = %slug, members = team.roles.len(), "Team membership fetched");
    }

    Ok(snapshot)
}
