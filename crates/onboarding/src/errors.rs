//! Error and retry-policy types for the onboarding domain.
//!
//! [`OnboardingError`] is the taxonomy users see: malformed input, a missing
//! group, a fatal authorization failure, or a single item that could not be
//! applied. [`DirectoryError`] is what implementations of
//! [`crate::OrgDirectory`] return; the orchestrator decides how each
//! [`DirectoryErrorKind`] maps onto the taxonomy.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Username;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types so the HTTP layer can decide whether
/// to re-issue a request before surfacing the failure.
///
/// - `Retryable` errors: timeouts, 5xx responses, rate-limit responses.
/// - `NonRetryable` errors: authentication, permission, validation, not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryPolicy::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// Classification of a failed [`crate::OrgDirectory`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryErrorKind {
    /// Credentials missing, expired, or rejected.
    Unauthorized,
    /// Credentials valid but lacking permission (e.g. not an org owner).
    Forbidden,
    /// The addressed resource does not exist (unknown user, org, or team).
    NotFound,
    /// The request was understood but rejected (e.g. already invited).
    Validation,
    /// Rate limit still exhausted after retries.
    RateLimited,
    /// Network failure, timeout, or server error still failing after retries.
    Transient,
    /// Anything else, including unparseable responses.
    Other,
}

impl DirectoryErrorKind {
    /// Returns `true` for kinds that invalidate the whole run rather than a
    /// single item.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            DirectoryErrorKind::Unauthorized | DirectoryErrorKind::Forbidden
        )
    }
}

/// A failed call through the [`crate::OrgDirectory`] port.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DirectoryError {
    /// What class of failure occurred.
    pub kind: DirectoryErrorKind,
    /// Human-readable detail, typically the API's own error message.
    pub message: String,
}

impl DirectoryError {
    /// Creates a new [`DirectoryError`].
    pub fn new(kind: DirectoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns `true` if this failure must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

// ---------------------------------------------------------------------------
// Onboarding errors
// ---------------------------------------------------------------------------

/// Errors reported by the roster loader and the synchronizer flows.
///
/// `MalformedInput`, `ApiAuth` and `ApiUnavailable` abort a run.
/// `MissingGroup` and `ApiItem` affect one student or one operation; the flows
/// collect them into a [`crate::RunReport`] and keep going.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum OnboardingError {
    /// The roster or group-assignment source could not be parsed or failed
    /// schema validation.
    #[error("Malformed input in {source_name}: {message}")]
    MalformedInput {
        /// File path or label of the input that failed.
        source_name: String,
        /// What was wrong, including the offending entry index where known.
        message: String,
    },

    /// A group is required for the requested operation but the student has none.
    #[error("Student '{username}' has no group assigned")]
    MissingGroup {
        /// The student without a group.
        username: Username,
    },

    /// Credentials or permissions are insufficient for the organization.
    ///
    /// Always fatal: the run stops at the first occurrence.
    #[error("GitHub authorization failed: {message}")]
    ApiAuth {
        /// Detail from the API or the access check.
        message: String,
    },

    /// Organization state could not be read, so no plan can be computed.
    ///
    /// Fatal: produced when listing members, invitations, or teams fails for
    /// a reason other than authorization.
    #[error("Could not read organization state ({operation}): {message}")]
    ApiUnavailable {
        /// What was being fetched (e.g. `"list members"`).
        operation: String,
        /// Detail from the API.
        message: String,
    },

    /// A single API operation failed; the remaining items are still processed.
    #[error("{operation} failed for {subject}: {message}")]
    ApiItem {
        /// Short operation label (e.g. `"invite"`, `"create team"`).
        operation: String,
        /// The user or team the operation targeted.
        subject: String,
        /// Detail from the API.
        message: String,
    },
}

impl OnboardingError {
    /// Creates an [`OnboardingError::MalformedInput`].
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates an [`OnboardingError::ApiItem`].
    pub fn item(
        operation: impl Into<String>,
        subject: impl std::fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::ApiItem {
            operation: operation.into(),
            subject: subject.to_string(),
            message: message.into(),
        }
    }

    /// Returns `true` for errors that abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OnboardingError::MalformedInput { .. }
                | OnboardingError::ApiAuth { .. }
                | OnboardingError::ApiUnavailable { .. }
        )
    }

    /// Maps a port error raised while reading organization state.
    ///
    /// Every failure here is fatal; authorization failures keep their own
    /// variant so the message points at credentials.
    pub fn from_snapshot_failure(operation: &str, err: DirectoryError) -> Self {
        if err.is_fatal() {
            Self::ApiAuth {
                message: err.message,
            }
        } else {
            Self::ApiUnavailable {
                operation: operation.to_string(),
                message: err.message,
            }
        }
    }

    /// Maps a port error raised while working on one item.
    ///
    /// Fatal kinds become [`OnboardingError::ApiAuth`]; everything else becomes
    /// an [`OnboardingError::ApiItem`] for `subject`.
    pub fn from_item_failure(
        operation: &str,
        subject: impl std::fmt::Display,
        err: DirectoryError,
    ) -> Self {
        if err.is_fatal() {
            Self::ApiAuth {
                message: err.message,
            }
        } else {
            Self::item(operation, subject, err.message)
        }
    }
}
