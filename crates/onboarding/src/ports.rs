//! The port through which the domain observes and changes an organization.
//!
//! Infrastructure crates implement [`OrgDirectory`]; the orchestration layer
//! depends only on the trait, so flows are tested against an in-memory fake.
//! Implementations handle transport concerns (authentication, pagination,
//! retries) and report whatever is left as a [`DirectoryError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    DirectoryError, GroupName, OrgName, OrgRole, PendingInvitation, TeamPrivacy, TeamRole,
    TeamSlug, TeamSummary, UserId, Username,
};

/// Settings for a team about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: GroupName,
    pub privacy: TeamPrivacy,
    pub description: Option<String>,
}

/// Read and write access to one GitHub organization's people and teams.
///
/// Every method addresses a single resource; list methods return the complete
/// collection (implementations follow pagination).
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Confirms the organization exists and the credentials can administer it.
    async fn check_org(&self, org: &OrgName) -> Result<(), DirectoryError>;

    /// Lists current organization members.
    async fn list_members(&self, org: &OrgName) -> Result<Vec<Username>, DirectoryError>;

    /// Lists invitations that have not been accepted yet.
    async fn list_pending_invitations(
        &self,
        org: &OrgName,
    ) -> Result<Vec<PendingInvitation>, DirectoryError>;

    /// Looks up the numeric account id for a login.
    async fn resolve_user_id(&self, username: &Username) -> Result<UserId, DirectoryError>;

    /// Invites a user to the organization.
    async fn create_invitation(
        &self,
        org: &OrgName,
        invitee: UserId,
        role: OrgRole,
    ) -> Result<(), DirectoryError>;

    /// Lists every team in the organization.
    async fn list_teams(&self, org: &OrgName) -> Result<Vec<TeamSummary>, DirectoryError>;

    /// Lists the members of a team holding exactly `role`.
    async fn list_team_members(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        role: TeamRole,
    ) -> Result<Vec<Username>, DirectoryError>;

    /// Creates a team and returns it as GitHub stored it.
    async fn create_team(&self, org: &OrgName, team: &NewTeam)
        -> Result<TeamSummary, DirectoryError>;

    /// Adds a user to a team, or changes their role if already on it.
    async fn set_team_membership(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        username: &Username,
        role: TeamRole,
    ) -> Result<(), DirectoryError>;
}
