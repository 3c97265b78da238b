//! Org onboarding GitHub infrastructure adapter.
//!
//! Implements [`onboarding::OrgDirectory`] for [`GitHubClient`], a small
//! typed client over the GitHub REST API built on [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (rate limiting, pagination, authentication) are handled
//! here; the [`onboarding`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |---|---|
//! | `check_org` | `GET /orgs/{org}` |
//! | `list_members` | `GET /orgs/{org}/members` |
//! | `list_pending_invitations` | `GET /orgs/{org}/invitations` |
//! | `resolve_user_id` | `GET /users/{username}` |
//! | `create_invitation` | `POST /orgs/{org}/invitations` |
//! | `list_teams` | `GET /orgs/{org}/teams` |
//! | `list_team_members` | `GET /orgs/{org}/teams/{slug}/members?role=` |
//! | `create_team` | `POST /orgs/{org}/teams` |
//! | `set_team_membership` | `PUT /orgs/{org}/teams/{slug}/memberships/{username}` |

mod client;
mod config;
mod directory;
mod error;
mod models;

pub use client::{GitHubClient, PAGE_SIZE};
pub use config::{GitHubConfig, RetryConfig, API_VERSION, DEFAULT_API_URL};
pub use error::GitHubError;
