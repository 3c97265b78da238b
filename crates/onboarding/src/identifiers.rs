//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`TeamSlug`] with an [`OrgName`] even though both are strings under the
//! hood.
//!
//! [`Username`] is the one identifier with real validation rules: GitHub logins
//! are 1–39 characters of ASCII alphanumerics and single hyphens, and compare
//! case-insensitively.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a trimmed value, returning `None`
            /// if nothing remains.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// The numeric account id GitHub assigns to a user.
    ///
    /// Organization invitations are addressed by id, not by login.
    UserId
}

u64_id! {
    /// Identifies a pending organization invitation.
    InvitationId
}

u64_id! {
    /// Identifies a team within an organization.
    TeamId
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single CLI invocation.
///
/// Generated fresh for every run and recorded on the root tracing span so all
/// API activity from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The login of a GitHub organization (e.g. `"DS-223-2025-Fall"`).
    OrgName
}

string_id! {
    /// A group label from the roster; becomes the display name of a team.
    GroupName
}

string_id! {
    /// The URL-safe identifier GitHub derives from a team name.
    ///
    /// Use [`TeamSlug::from_name`] to derive one the same way GitHub does.
    TeamSlug
}

impl TeamSlug {
    /// Derives a slug from a display name: lowercase, every run of characters
    /// outside `[a-z0-9]` collapsed to a single `-`, leading and trailing `-`
    /// removed. An empty result falls back to `"team"`.
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for ch in name.trim().chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch);
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            slug.push_str("team");
        }
        Self(slug)
    }
}

impl GroupName {
    /// Returns the team slug GitHub will assign to a team with this name.
    pub fn slug(&self) -> TeamSlug {
        TeamSlug::from_name(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Username
// ---------------------------------------------------------------------------

/// Maximum length of a GitHub login.
pub const MAX_USERNAME_LEN: usize = 39;

/// Why a string was rejected as a GitHub username.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,

    #[error("username '{value}' is longer than 39 characters")]
    TooLong { value: String },

    #[error("username '{value}' contains invalid character '{ch}'")]
    InvalidCharacter { value: String, ch: char },

    #[error("username '{value}' may not begin or end with a hyphen")]
    EdgeHyphen { value: String },

    #[error("username '{value}' contains consecutive hyphens")]
    ConsecutiveHyphens { value: String },
}

/// A validated GitHub login.
///
/// Equality, ordering and hashing ignore ASCII case because GitHub treats
/// `Alice` and `alice` as the same account. [`Display`](std::fmt::Display)
/// keeps the spelling the value was created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Parses a username as it appears in a roster or on the command line.
    ///
    /// Surrounding whitespace and a single leading `@` are stripped first.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let value = raw.trim();
        let value = value.strip_prefix('@').unwrap_or(value).trim();

        if value.is_empty() {
            return Err(UsernameError::Empty);
        }
        if value.chars().count() > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong {
                value: value.to_string(),
            });
        }
        if let Some(ch) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(UsernameError::InvalidCharacter {
                value: value.to_string(),
                ch,
            });
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(UsernameError::EdgeHyphen {
                value: value.to_string(),
            });
        }
        if value.contains("--") {
            return Err(UsernameError::ConsecutiveHyphens {
                value: value.to_string(),
            });
        }

        Ok(Self(value.to_string()))
    }

    /// Returns the username as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercase form used for comparisons.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for Username {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Username {}

impl Hash for Username {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for Username {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Username {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
