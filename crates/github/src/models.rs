//! Wire types for the GitHub REST endpoints this crate calls.
//!
//! Only the fields the adapter reads are declared; serde ignores the rest.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct OrgResponse {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub login: String,
}

/// Entry of `GET /orgs/{org}/members` and `GET /orgs/{org}/teams/{slug}/members`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberResponse {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationResponse {
    pub id: u64,
    pub login: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamResponse {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateInvitationRequest<'a> {
    pub invitee_id: u64,
    pub role: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTeamRequest<'a> {
    pub name: &'a str,
    pub privacy: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMembershipRequest<'a> {
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// GitHub's error envelope: `{"message": "...", "errors": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ErrorBody {
    /// Produces a one-line message from a response body, falling back to the
    /// status reason when the body is not GitHub's JSON envelope.
    pub fn summarize(body: &str, status: StatusCode) -> String {
        let fallback = || {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        };

        let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
            return fallback();
        };

        let mut message = parsed.message.unwrap_or_else(fallback);
        let details: Vec<String> = parsed
            .errors
            .iter()
            .filter_map(|d| {
                d.message.clone().or_else(|| match (&d.field, &d.code) {
                    (Some(field), Some(code)) => Some(format!("{field} {code}")),
                    (None, Some(code)) => Some(code.clone()),
                    _ => None,
                })
            })
            .collect();
        if !details.is_empty() {
            message.push_str(" (");
            message.push_str(&details.join("; "));
            message.push(')');
        }
        message
    }
}
