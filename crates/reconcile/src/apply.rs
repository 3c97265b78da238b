//! Executing a [`Plan`] against the port.
//!
//! Operations run one at a time in plan order. A failure on one item is
//! recorded in the [`RunReport`] and the next operation proceeds; an
//! authorization failure stops everything immediately.

use std::collections::{HashMap, HashSet};

use onboarding::{
    DirectoryError, NewTeam, OnboardingError, Operation, OrgDirectory, OrgName, OrgRole,
    RunReport, TeamPrivacy, TeamRole, TeamSlug,
};
use tracing::{info, instrument, warn};

/// Settings the plan itself does not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySettings {
    /// Role granted by organization invitations.
    pub invite_role: OrgRole,
    /// Visibility of created teams.
    pub team_privacy: TeamPrivacy,
    /// Description given to created teams.
    pub team_description: Option<String>,
}

/// Applies every operation of `report.plan`, appending successes to
/// `report.applied` and item failures to `report.failures`.
///
/// If a team cannot be created, the membership operations for that team are
/// not attempted and are recorded as failures. When GitHub assigns a slug
/// different from the predicted one, later operations follow the real slug.
#[instrument(skip_all, fields(org = %org, operations = report.plan.operations.len()))]
pub async fn apply_plan(
    directory: &dyn OrgDirectory,
    org: &OrgName,
    settings: &ApplySettings,
    report: &mut RunReport,
) -> Result<(), OnboardingError> {
    let operations = report.plan.operations.clone();
    let total = operations.len();
    let mut renamed: HashMap<TeamSlug, TeamSlug> = HashMap::new();
    let mut failed_teams: HashSet<TeamSlug> = HashSet::new();

    for (index, op) in operations.into_iter().enumerate() {
        let position = index + 1;

        if let Some(team) = op.team() {
            if failed_teams.contains(team) && !matches!(op, Operation::CreateTeam { .. }) {
                let err = OnboardingError::item(
                    op.label(),
                    op.subject(),
                    "skipped because the team could not be created",
                );
                warn!(position, total, error = %err, "Operation skipped");
                report.failures.push(err);
                continue;
            }
        }

        match apply_one(directory, org, settings, &op, &mut renamed).await {
            Ok(()) => {
                info!(position, total, operation = %op, "Applied");
                report.applied.push(op);
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(position, total, error = %err, "Operation failed");
                if let Operation::CreateTeam { slug, .. } = &op {
                    failed_teams.insert(slug.clone());
                }
                report.failures.push(err);
            }
        }
    }

    Ok(())
}

async fn apply_one(
    directory: &dyn OrgDirectory,
    org: &OrgName,
    settings: &ApplySettings,
    op: &Operation,
    renamed: &mut HashMap<TeamSlug, TeamSlug>,
) -> Result<(), OnboardingError> {
    let fail = |e: DirectoryError| OnboardingError::from_item_failure(op.label(), op.subject(), e);

    match op {
        Operation::Invite { username } => {
            let invitee = directory.resolve_user_id(username).await.map_err(|e| {
                OnboardingError::from_item_failure("resolve user id", username, e)
            })?;
            directory
                .create_invitation(org, invitee, settings.invite_role)
                .await
                .map_err(fail)
        }
        Operation::CreateTeam { name, slug } => {
            let request = NewTeam {
                name: name.clone(),
                privacy: settings.team_privacy,
                description: settings.team_description.clone(),
            };
            let created = directory.create_team(org, &request).await.map_err(fail)?;
            if &created.slug != slug {
                info!(
                    predicted = %slug,
                    actual = %created.slug,
                    "Team slug differs from prediction"
                );
                renamed.insert(slug.clone(), created.slug);
            }
            Ok(())
        }
        Operation::AddToTeam {
            team,
            username,
            role,
        } => {
            let team = renamed.get(team).unwrap_or(team);
            directory
                .set_team_membership(org, team, username, *role)
                .await
                .map_err(fail)
        }
        Operation::PromoteToMaintainer { team, username } => {
            let team = renamed.get(team).unwrap_or(team);
            directory
                .set_team_membership(org, team, username, TeamRole::Maintainer)
                .await
                .map_err(fail)
        }
    }
}
