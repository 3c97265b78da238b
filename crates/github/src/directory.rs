//! [`OrgDirectory`] over the GitHub REST API.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use onboarding::{
    DirectoryError, InvitationId, NewTeam, OrgDirectory, OrgName, OrgRole, PendingInvitation,
    TeamId, TeamRole, TeamSlug, TeamSummary, UserId, Username,
};

use crate::client::segment;
use crate::models::{
    CreateInvitationRequest, CreateTeamRequest, InvitationResponse, MemberResponse, OrgResponse,
    TeamMembershipRequest, TeamResponse, UserResponse,
};
use crate::GitHubClient;

#[async_trait]
impl OrgDirectory for GitHubClient {
    #[instrument(skip_all, fields(org = %org))]
    async fn check_org(&self, org: &OrgName) -> Result<(), DirectoryError> {
        let path = format!("/orgs/{}", segment(org.as_str()));
        let found: OrgResponse = self.get_json(&path).await?;
        debug!(login = %found.login, "Organization reachable");
        Ok(())
    }

    #[instrument(skip_all, fields(org = %org))]
    async fn list_members(&self, org: &OrgName) -> Result<Vec<Username>, DirectoryError> {
        let path = format!("/orgs/{}/members", segment(org.as_str()));
        let members: Vec<MemberResponse> = self.get_paginated(&path).await?;
        Ok(logins(members))
    }

    #[instrument(skip_all, fields(org = %org))]
    async fn list_pending_invitations(
        &self,
        org: &OrgName,
    ) -> Result<Vec<PendingInvitation>, DirectoryError> {
        let path = format!("/orgs/{}/invitations", segment(org.as_str()));
        let invitations: Vec<InvitationResponse> = self.get_paginated(&path).await?;
        Ok(invitations
            .into_iter()
            .map(|inv| PendingInvitation {
                id: InvitationId::new(inv.id),
                login: inv.login.as_deref().and_then(parse_login),
                email: inv.email,
            })
            .collect())
    }

    #[instrument(skip_all, fields(username = %username))]
    async fn resolve_user_id(&self, username: &Username) -> Result<UserId, DirectoryError> {
        let path = format!("/users/{}", segment(username.as_str()));
        let user: UserResponse = self.get_json(&path).await?;
        debug!(login = %user.login, id = user.id, "Resolved user");
        Ok(UserId::new(user.id))
    }

    #[instrument(skip_all, fields(org = %org, invitee = %invitee, role = %role))]
    async fn create_invitation(
        &self,
        org: &OrgName,
        invitee: UserId,
        role: OrgRole,
    ) -> Result<(), DirectoryError> {
        let path = format!("/orgs/{}/invitations", segment(org.as_str()));
        let body = CreateInvitationRequest {
            invitee_id: invitee.as_u64(),
            role: role.as_str(),
        };
        self.send_without_reply(Method::POST, &path, &body).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(org = %org))]
    async fn list_teams(&self, org: &OrgName) -> Result<Vec<TeamSummary>, DirectoryError> {
        let path = format!("/orgs/{}/teams", segment(org.as_str()));
        let teams: Vec<TeamResponse> = self.get_paginated(&path).await?;
        Ok(teams.into_iter().map(team_summary).collect())
    }

    #[instrument(skip_all, fields(org = %org, team = %team, role = %role))]
    async fn list_team_members(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        role: TeamRole,
    ) -> Result<Vec<Username>, DirectoryError> {
        let path = format!(
            "/orgs/{}/teams/{}/members?role={}",
            segment(org.as_str()),
            segment(team.as_str()),
            role.as_str()
        );
        let members: Vec<MemberResponse> = self.get_paginated(&path).await?;
        Ok(logins(members))
    }

    #[instrument(skip_all, fields(org = %org, team = %team.name))]
    async fn create_team(
        &self,
        org: &OrgName,
        team: &NewTeam,
    ) -> Result<TeamSummary, DirectoryError> {
        let path = format!("/orgs/{}/teams", segment(org.as_str()));
        let body = CreateTeamRequest {
            name: team.name.as_str(),
            privacy: team.privacy.as_str(),
            description: team.description.as_deref(),
        };
        let created: TeamResponse = self.post_json(&path, &body).await?;
        Ok(team_summary(created))
    }

    #[instrument(skip_all, fields(org = %org, team = %team, username = %username, role = %role))]
    async fn set_team_membership(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        username: &Username,
        role: TeamRole,
    ) -> Result<(), DirectoryError> {
        let path = format!(
            "/orgs/{}/teams/{}/memberships/{}",
            segment(org.as_str()),
            segment(team.as_str()),
            segment(username.as_str())
        );
        let body = TeamMembershipRequest {
            role: role.as_str(),
        };
        self.send_without_reply(Method::PUT, &path, &body).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn parse_login(login: &str) -> Option<Username> {
    match Username::parse(login) {
        Ok(username) => Some(username),
        Err(e) => {
            debug!(login, error = %e, "Skipping login the API returned in an unexpected form");
            None
        }
    }
}

fn logins(members: Vec<MemberResponse>) -> Vec<Username> {
    members
        .iter()
        .filter_map(|m| parse_login(&m.login))
        .collect()
}

fn team_summary(team: TeamResponse) -> TeamSummary {
    let slug = TeamSlug::new(team.slug).unwrap_or_else(|| TeamSlug::from_name(&team.name));
    TeamSummary {
        id: TeamId::new(team.id),
        name: team.name,
        slug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_summary_keeps_server_slug() {
        let summary = team_summary(TeamResponse {
            id: 7,
            name: "Team 1".to_string(),
            slug: "team-1-2".to_string(),
        });
        assert_eq!(summary.slug.as_str(), "team-1-2");
        assert_eq!(summary.id, TeamId::new(7));
    }

    #[test]
    fn team_summary_derives_missing_slug() {
        let summary = team_summary(TeamResponse {
            id: 7,
            name: "Team 1".to_string(),
            slug: String::new(),
        });
        assert_eq!(summary.slug.as_str(), "team-1");
    }

    #[test]
    fn unexpected_logins_are_dropped() {
        let members = vec![
            MemberResponse {
                login: "alice".to_string(),
            },
            MemberResponse {
                login: "dependabot[bot]".to_string(),
            },
        ];
        let names: Vec<String> = logins(members).iter().map(|u| u.to_string()).collect();
        assert_eq!(names, vec!["alice"]);
    }
}
