//! Pure reconciliation planners.
//!
//! A planner takes the desired state (from the roster) and the observed state
//! (a snapshot fetched through [`crate::OrgDirectory`]) and returns a [`Plan`]:
//! the operations that would close the gap, plus every item that needs no
//! change and why. Planners never perform I/O, so dry-run output and the
//! idempotence guarantees are decided entirely here.
//!
//! Re-planning against a snapshot taken after a successful apply yields an
//! empty operation list.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    DesiredTeam, GroupName, PendingInvitation, Roster, TeamRole, TeamSlug, TeamSummary, Username,
};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One mutating call the synchronizer would make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Invite a user to the organization.
    Invite { username: Username },

    /// Create a team named after a roster group.
    CreateTeam { name: GroupName, slug: TeamSlug },

    /// Add a user to a team with the given role.
    AddToTeam {
        team: TeamSlug,
        username: Username,
        role: TeamRole,
    },

    /// Raise an existing team member to maintainer.
    PromoteToMaintainer { team: TeamSlug, username: Username },
}

impl Operation {
    /// Short label used in logs and error reports.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Invite { .. } => "invite",
            Operation::CreateTeam { .. } => "create team",
            Operation::AddToTeam { .. } => "add to team",
            Operation::PromoteToMaintainer { .. } => "promote to maintainer",
        }
    }

    /// The team this operation touches, if any.
    pub fn team(&self) -> Option<&TeamSlug> {
        match self {
            Operation::Invite { .. } => None,
            Operation::CreateTeam { slug, .. } => Some(slug),
            Operation::AddToTeam { team, .. } | Operation::PromoteToMaintainer { team, .. } => {
                Some(team)
            }
        }
    }

    /// Identifies what the operation targets (`alice`, `team1`, `team1/alice`).
    pub fn subject(&self) -> String {
        match self {
            Operation::Invite { username } => username.to_string(),
            Operation::CreateTeam { name, .. } => name.to_string(),
            Operation::AddToTeam { team, username, .. }
            | Operation::PromoteToMaintainer { team, username } => format!("{team}/{username}"),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Invite { username } => write!(f, "invite {username}"),
            Operation::CreateTeam { name, slug } => {
                write!(f, "create team '{name}' (slug: {slug})")
            }
            Operation::AddToTeam {
                team,
                username,
                role,
            } => write!(f, "add {username} to {team} as {role}"),
            Operation::PromoteToMaintainer { team, username } => {
                write!(f, "promote {username} to maintainer of {team}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

/// Why an item needs no operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyMember,
    AlreadyInvited,
    TeamExists,
    AlreadyInTeam(TeamRole),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyMember => f.write_str("already a member"),
            SkipReason::AlreadyInvited => f.write_str("invitation pending"),
            SkipReason::TeamExists => f.write_str("team exists"),
            SkipReason::AlreadyInTeam(role) => write!(f, "already in team ({role})"),
        }
    }
}

/// An item the planner left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub subject: String,
    pub reason: SkipReason,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The difference between desired and observed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Operations in the order they must be applied.
    pub operations: Vec<Operation>,
    /// Items already in the desired state.
    pub skipped: Vec<Skipped>,
}

impl Plan {
    /// Returns `true` when nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn skip(&mut self, subject: impl Into<String>, reason: SkipReason) {
        self.skipped.push(Skipped {
            subject: subject.into(),
            reason,
        });
    }
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// Observed organization membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSnapshot {
    members: HashSet<Username>,
    pending: HashSet<Username>,
}

impl MembershipSnapshot {
    /// Builds a snapshot from listed members and pending invitations.
    ///
    /// Invitations without a login (sent by email) cannot match a roster
    /// username and are ignored.
    pub fn new(
        members: impl IntoIterator<Item = Username>,
        invitations: impl IntoIterator<Item = PendingInvitation>,
    ) -> Self {
        Self {
            members: members.into_iter().collect(),
            pending: invitations.into_iter().filter_map(|i| i.login).collect(),
        }
    }

    /// Returns `true` if `username` already belongs to the organization.
    pub fn is_member(&self, username: &Username) -> bool {
        self.members.contains(username)
    }

    /// Returns `true` if `username` has an unanswered invitation.
    pub fn is_invited(&self, username: &Username) -> bool {
        self.pending.contains(username)
    }
}

/// Plans organization invitations for every roster student who is neither a
/// member nor already invited, in roster order.
pub fn plan_invitations(roster: &Roster, observed: &MembershipSnapshot) -> Plan {
    let mut plan = Plan::default();
    for student in roster.students() {
        let username = &student.username;
        if observed.is_member(username) {
            plan.skip(username.to_string(), SkipReason::AlreadyMember);
        } else if observed.is_invited(username) {
            plan.skip(username.to_string(), SkipReason::AlreadyInvited);
        } else {
            plan.operations.push(Operation::Invite {
                username: username.clone(),
            });
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// An existing team and the roles of its current members.
///
/// `roles` is only populated for teams the roster asks for; other teams are
/// listed so creation can be skipped but their membership is never fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTeam {
    pub summary: TeamSummary,
    pub roles: HashMap<Username, TeamRole>,
}

/// Observed teams of the organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamsSnapshot {
    pub teams: Vec<ObservedTeam>,
}

impl TeamsSnapshot {
    /// Finds the existing team matching a desired one, by slug first and
    /// then by case-insensitive name.
    pub fn find(&self, desired: &DesiredTeam) -> Option<&ObservedTeam> {
        self.teams
            .iter()
            .find(|t| t.summary.slug == desired.slug)
            .or_else(|| {
                self.teams.iter().find(|t| {
                    t.summary
                        .name
                        .trim()
                        .eq_ignore_ascii_case(desired.name.as_str())
                })
            })
    }
}

/// Plans team creation and membership.
///
/// For each desired team, in the given order: create it if absent, ensure
/// every instructor is a maintainer (adding or promoting), then ensure every
/// student is on the team. A student who is also an instructor is handled
/// as an instructor. Existing maintainers are never demoted.
pub fn plan_teams(
    desired: &[DesiredTeam],
    instructors: &[Username],
    observed: &TeamsSnapshot,
) -> Plan {
    let mut plan = Plan::default();
    let no_roles = HashMap::new();

    let mut unique_instructors: Vec<&Username> = Vec::new();
    for instructor in instructors {
        if !unique_instructors.contains(&instructor) {
            unique_instructors.push(instructor);
        }
    }

    for team in desired {
        let existing = observed.find(team);
        let slug = existing
            .map(|t| t.summary.slug.clone())
            .unwrap_or_else(|| team.slug.clone());
        let roles = existing.map(|t| &t.roles).unwrap_or(&no_roles);

        match existing {
            Some(_) => plan.skip(team.name.to_string(), SkipReason::TeamExists),
            None => plan.operations.push(Operation::CreateTeam {
                name: team.name.clone(),
                slug: slug.clone(),
            }),
        }

        for instructor in &unique_instructors {
            let subject = format!("{slug}/{instructor}");
            match roles.get(*instructor) {
                Some(TeamRole::Maintainer) => {
                    plan.skip(subject, SkipReason::AlreadyInTeam(TeamRole::Maintainer))
                }
                Some(TeamRole::Member) => plan.operations.push(Operation::PromoteToMaintainer {
                    team: slug.clone(),
                    username: (*instructor).clone(),
                }),
                None => plan.operations.push(Operation::AddToTeam {
                    team: slug.clone(),
                    username: (*instructor).clone(),
                    role: TeamRole::Maintainer,
                }),
            }
        }

        let mut seen: HashSet<&Username> = HashSet::new();
        for student in &team.members {
            if unique_instructors.contains(&student) || !seen.insert(student) {
                continue;
            }
            match roles.get(student) {
                Some(role) => plan.skip(
                    format!("{slug}/{student}"),
                    SkipReason::AlreadyInTeam(*role),
                ),
                None => plan.operations.push(Operation::AddToTeam {
                    team: slug.clone(),
                    username: student.clone(),
                    role: TeamRole::Member,
                }),
            }
        }
    }

    plan
}
