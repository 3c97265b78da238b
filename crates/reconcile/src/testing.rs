//! In-memory [`OrgDirectory`] for flow tests.
//!
//! Mutations update the fake's state, so running a flow twice observes the
//! effects of the first run. Only successful mutating calls are recorded.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use onboarding::{
    DirectoryError, DirectoryErrorKind, InvitationId, NewTeam, OrgDirectory, OrgName, OrgRole,
    PendingInvitation, TeamId, TeamRole, TeamSlug, TeamSummary, UserId, Username,
};

/// A mutating call that reached the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Invite { username: String, role: OrgRole },
    CreateTeam { name: String },
    SetMembership { team: String, username: String, role: TeamRole },
}

#[derive(Default)]
struct State {
    users: HashMap<Username, UserId>,
    members: Vec<Username>,
    invitations: Vec<PendingInvitation>,
    teams: Vec<(TeamSummary, HashMap<Username, TeamRole>)>,
    calls: Vec<Call>,
    org_failure: Option<DirectoryErrorKind>,
    list_failure: Option<DirectoryErrorKind>,
    invite_failures: HashMap<Username, DirectoryErrorKind>,
    create_team_failures: HashMap<String, DirectoryErrorKind>,
    membership_failures: HashMap<Username, DirectoryErrorKind>,
    slug_overrides: HashMap<String, String>,
}

#[derive(Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

fn user(name: &str) -> Username {
    Username::parse(name).expect("test username is valid")
}

fn fail(kind: DirectoryErrorKind, what: &str) -> DirectoryError {
    DirectoryError::new(kind, format!("{what}: injected {kind:?}"))
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake directory lock poisoned")
    }

    /// Registers GitHub accounts that `resolve_user_id` can find.
    pub fn with_users(self, names: &[&str]) -> Self {
        {
            let mut state = self.state();
            for name in names {
                let id = UserId::new(1000 + state.users.len() as u64);
                state.users.insert(user(name), id);
            }
        }
        self
    }

    pub fn with_members(self, names: &[&str]) -> Self {
        self.state().members.extend(names.iter().map(|n| user(n)));
        self
    }

    pub fn with_team(self, name: &str, roles: &[(&str, TeamRole)]) -> Self {
        {
            let mut state = self.state();
            let summary = TeamSummary {
                id: TeamId::new(state.teams.len() as u64 + 1),
                name: name.to_string(),
                slug: TeamSlug::from_name(name),
            };
            let roles = roles.iter().map(|(u, r)| (user(u), *r)).collect();
            state.teams.push((summary, roles));
        }
        self
    }

    pub fn fail_org_check(self, kind: DirectoryErrorKind) -> Self {
        self.state().org_failure = Some(kind);
        self
    }

    pub fn fail_listing(self, kind: DirectoryErrorKind) -> Self {
        self.state().list_failure = Some(kind);
        self
    }

    pub fn fail_invite(self, name: &str, kind: DirectoryErrorKind) -> Self {
        self.state().invite_failures.insert(user(name), kind);
        self
    }

    pub fn fail_create_team(self, name: &str, kind: DirectoryErrorKind) -> Self {
        self.state()
            .create_team_failures
            .insert(name.to_string(), kind);
        self
    }

    pub fn fail_membership(self, name: &str, kind: DirectoryErrorKind) -> Self {
        self.state().membership_failures.insert(user(name), kind);
        self
    }

    /// Makes `create_team` assign `slug` to a team named `name`.
    pub fn assign_slug(self, name: &str, slug: &str) -> Self {
        self.state()
            .slug_overrides
            .insert(name.to_string(), slug.to_string());
        self
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Current roles on the team with `slug`, sorted by username.
    pub fn team_roles(&self, slug: &str) -> Vec<(String, TeamRole)> {
        let state = self.state();
        let mut roles: Vec<(String, TeamRole)> = state
            .teams
            .iter()
            .find(|(t, _)| t.slug.as_str() == slug)
            .map(|(_, roles)| {
                roles
                    .iter()
                    .map(|(u, r)| (u.as_str().to_string(), *r))
                    .collect()
            })
            .unwrap_or_default();
        roles.sort();
        roles
    }
}

#[async_trait]
impl OrgDirectory for FakeDirectory {
    async fn check_org(&self, _org: &OrgName) -> Result<(), DirectoryError> {
        match self.state().org_failure {
            Some(kind) => Err(fail(kind, "check org")),
            None => Ok(()),
        }
    }

    async fn list_members(&self, _org: &OrgName) -> Result<Vec<Username>, DirectoryError> {
        let state = self.state();
        if let Some(kind) = state.list_failure {
            return Err(fail(kind, "list members"));
        }
        Ok(state.members.clone())
    }

    async fn list_pending_invitations(
        &self,
        _org: &OrgName,
    ) -> Result<Vec<PendingInvitation>, DirectoryError> {
        Ok(self.state().invitations.clone())
    }

    async fn resolve_user_id(&self, username: &Username) -> Result<UserId, DirectoryError> {
        self.state()
            .users
            .get(username)
            .copied()
            .ok_or_else(|| fail(DirectoryErrorKind::NotFound, "resolve user"))
    }

    async fn create_invitation(
        &self,
        _org: &OrgName,
        invitee: UserId,
        role: OrgRole,
    ) -> Result<(), DirectoryError> {
        let mut state = self.state();
        let username = state
            .users
            .iter()
            .find(|(_, id)| **id == invitee)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| fail(DirectoryErrorKind::NotFound, "invite"))?;
        if let Some(kind) = state.invite_failures.get(&username) {
            return Err(fail(*kind, "invite"));
        }
        let id = InvitationId::new(state.invitations.len() as u64 + 1);
        state.invitations.push(PendingInvitation {
            id,
            login: Some(username.clone()),
            email: None,
        });
        state.calls.push(Call::Invite {
            username: username.as_str().to_string(),
            role,
        });
        Ok(())
    }

    async fn list_teams(&self, _org: &OrgName) -> Result<Vec<TeamSummary>, DirectoryError> {
        let state = self.state();
        if let Some(kind) = state.list_failure {
            return Err(fail(kind, "list teams"));
        }
        Ok(state.teams.iter().map(|(t, _)| t.clone()).collect())
    }

    async fn list_team_members(
        &self,
        _org: &OrgName,
        team: &TeamSlug,
        role: TeamRole,
    ) -> Result<Vec<Username>, DirectoryError> {
        let state = self.state();
        let (_, roles) = state
            .teams
            .iter()
            .find(|(t, _)| &t.slug == team)
            .ok_or_else(|| fail(DirectoryErrorKind::NotFound, "list team members"))?;
        Ok(roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn create_team(
        &self,
        _org: &OrgName,
        team: &NewTeam,
    ) -> Result<TeamSummary, DirectoryError> {
        let mut state = self.state();
        let name = team.name.as_str().to_string();
        if let Some(kind) = state.create_team_failures.get(&name) {
            return Err(fail(*kind, "create team"));
        }
        let slug = match state.slug_overrides.get(&name) {
            Some(slug) => TeamSlug::new(slug.clone()).expect("override slug is non-empty"),
            None => team.name.slug(),
        };
        let summary = TeamSummary {
            id: TeamId::new(state.teams.len() as u64 + 1),
            name: name.clone(),
            slug,
        };
        state.teams.push((summary.clone(), HashMap::new()));
        state.calls.push(Call::CreateTeam { name });
        Ok(summary)
    }

    async fn set_team_membership(
        &self,
        _org: &OrgName,
        team: &TeamSlug,
        username: &Username,
        role: TeamRole,
    ) -> Result<(), DirectoryError> {
        let mut state = self.state();
        if let Some(kind) = state.membership_failures.get(username) {
            return Err(fail(*kind, "set membership"));
        }
        let (_, roles) = state
            .teams
            .iter_mut()
            .find(|(t, _)| &t.slug == team)
            .ok_or_else(|| fail(DirectoryErrorKind::NotFound, "set membership"))?;
        roles.insert(username.clone(), role);
        state.calls.push(Call::SetMembership {
            team: team.as_str().to_string(),
            username: username.as_str().to_string(),
            role,
        });
        Ok(())
    }
}
