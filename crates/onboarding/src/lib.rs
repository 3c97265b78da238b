//! Core domain for org onboarding.
//!
//! This crate owns every domain concept used to onboard a class into a GitHub
//! organization: validated identifiers, the roster and its group assignments,
//! the pure planners that diff desired against observed state, and the
//! [`OrgDirectory`] port that infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies
//! beyond reading roster files. It defines *what* is needed; infrastructure
//! crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Username`, `OrgName`, `TeamSlug`, etc.) |
//! | [`types`] | Records and settings (`Student`, roles, team privacy, `Timestamp`) |
//! | [`errors`] | Error taxonomy, port errors, and retry policy |
//! | [`roster`] | Roster loading, group merging, grouping into teams |
//! | [`plan`] | Pure invitation and team planners |
//! | [`report`] | Per-run outcome and summary counts |
//! | [`ports`] | The [`OrgDirectory`] trait |

pub mod errors;
pub mod identifiers;
pub mod plan;
pub mod ports;
pub mod report;
pub mod roster;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{DirectoryError, DirectoryErrorKind, OnboardingError, RetryPolicy};
pub use identifiers::{
    GroupName, InvitationId, OrgName, RunId, TeamId, TeamSlug, UserId, Username, UsernameError,
    MAX_USERNAME_LEN,
};
pub use plan::{
    plan_invitations, plan_teams, MembershipSnapshot, ObservedTeam, Operation, Plan, SkipReason,
    Skipped, TeamsSnapshot,
};
pub use ports::{NewTeam, OrgDirectory};
pub use report::{ReportSummary, RunReport};
pub use roster::{DesiredTeam, GroupAssignments, Grouping, MergeMode, MergeOutcome, Roster};
pub use types::{
    OrgRole, PendingInvitation, Student, TeamPrivacy, TeamRole, TeamSummary, Timestamp,
};
