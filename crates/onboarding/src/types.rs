//! Shared value types for the onboarding domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types describe
//! records and settings: a student entry from the roster, the roles GitHub
//! knows about, and what a team or invitation looks like when observed.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GroupName, InvitationId, TeamId, TeamSlug, Username};

// ---------------------------------------------------------------------------
// Roster records
// ---------------------------------------------------------------------------

/// One student entry from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// The student's GitHub login.
    pub username: Username,

    /// Display name, when the roster provides one.
    pub name: Option<String>,

    /// Group label; students sharing a group end up on the same team.
    pub group: Option<GroupName>,
}

impl Student {
    /// Returns the display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(self.username.as_str())
    }
}

// ---------------------------------------------------------------------------
// Roles and settings
// ---------------------------------------------------------------------------

/// Role granted by an organization invitation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Regular organization member.
    #[default]
    DirectMember,
    /// Organization owner.
    Admin,
}

impl OrgRole {
    /// Returns the wire name used by the GitHub API.
    pub fn as_str(self) -> &'static str {
        match self {
            OrgRole::DirectMember => "direct_member",
            OrgRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "direct_member" => Ok(OrgRole::DirectMember),
            "admin" => Ok(OrgRole::Admin),
            other => Err(format!(
                "unknown org role '{other}' (expected direct_member or admin)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------

/// Role of a user within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Regular team member.
    Member,
    /// Can manage team membership and settings. Instructors get this role.
    Maintainer,
}

impl TeamRole {
    /// Returns the wire name used by the GitHub API.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamRole::Member => "member",
            TeamRole::Maintainer => "maintainer",
        }
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Visibility of a newly created team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamPrivacy {
    /// Visible to every organization member.
    #[default]
    Closed,
    /// Visible only to team members and owners.
    Secret,
}

impl TeamPrivacy {
    /// Returns the wire name used by the GitHub API.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamPrivacy::Closed => "closed",
            TeamPrivacy::Secret => "secret",
        }
    }
}

impl std::fmt::Display for TeamPrivacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "closed" => Ok(TeamPrivacy::Closed),
            "secret" => Ok(TeamPrivacy::Secret),
            other => Err(format!(
                "unknown team privacy '{other}' (expected closed or secret)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Observed organization objects
// ---------------------------------------------------------------------------

/// A pending organization invitation as reported by the API.
///
/// Invitations sent by email have no login until accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvitation {
    pub id: InvitationId,
    pub login: Option<Username>,
    pub email: Option<String>,
}

/// A team that exists in the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub name: String,
    pub slug: TeamSlug,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
