//! Roster loading, group merging, and grouping students into teams.
//!
//! The roster is a JSON array of objects:
//!
//! ```json
//! [
//!   { "username": "alice", "group": "team1", "name": "Alice Liddell" },
//!   { "username": "@bob",  "group": "team1" },
//! ]
//! ```
//!
//! Trailing commas before `]` or `}` are tolerated because rosters are usually
//! pasted together by hand. Unknown keys are ignored. Every validation failure
//! is reported as [`OnboardingError::MalformedInput`] naming the entry index,
//! and happens before any API call is made.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{GroupName, OnboardingError, Student, TeamSlug, Username};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is valid"));

/// Parses JSON text, dropping trailing commas first.
fn parse_lenient_json(source_name: &str, text: &str) -> Result<Value, OnboardingError> {
    let cleaned = TRAILING_COMMA.replace_all(text, "$1");
    serde_json::from_str(&cleaned)
        .map_err(|e| OnboardingError::malformed(source_name, format!("invalid JSON: {e}")))
}

fn read_file(path: &Path) -> Result<String, OnboardingError> {
    std::fs::read_to_string(path).map_err(|e| {
        OnboardingError::malformed(path.display().to_string(), format!("cannot read file: {e}"))
    })
}

/// Reads an optional string-ish field. Integers are accepted for groups since
/// spreadsheets often number them.
fn optional_text(
    source_name: &str,
    index: usize,
    entry: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, OnboardingError> {
    match entry.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Some(other) => Err(OnboardingError::malformed(
            source_name,
            format!("entry {index}: '{key}' must be a string, found {other}"),
        )),
    }
}

fn required_username(
    source_name: &str,
    index: usize,
    entry: &Map<String, Value>,
) -> Result<Username, OnboardingError> {
    let raw = match entry.get("username") {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(OnboardingError::malformed(
                source_name,
                format!("entry {index}: 'username' must be a string, found {other}"),
            ))
        }
        None => {
            return Err(OnboardingError::malformed(
                source_name,
                format!("entry {index}: missing required key 'username'"),
            ))
        }
    };
    Username::parse(raw)
        .map_err(|e| OnboardingError::malformed(source_name, format!("entry {index}: {e}")))
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The validated, de-duplicated list of students in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    source_name: String,
    students: Vec<Student>,
}

impl Roster {
    /// Loads and validates a roster file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OnboardingError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        Self::from_json_str(&path.display().to_string(), &text)
    }

    /// Parses and validates roster JSON. `source_name` labels error messages.
    pub fn from_json_str(source_name: &str, text: &str) -> Result<Self, OnboardingError> {
        let value = parse_lenient_json(source_name, text)?;
        let entries = match value {
            Value::Array(entries) => entries,
            other => {
                return Err(OnboardingError::malformed(
                    source_name,
                    format!("expected a JSON array of students, found {}", kind_of(&other)),
                ))
            }
        };

        let mut students: Vec<Student> = Vec::with_capacity(entries.len());
        let mut seen: HashMap<Username, usize> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            let Value::Object(entry) = entry else {
                return Err(OnboardingError::malformed(
                    source_name,
                    format!("entry {index}: expected an object, found {}", kind_of(entry)),
                ));
            };

            let username = required_username(source_name, index, entry)?;
            let name = optional_text(source_name, index, entry, "name")?;
            let group = optional_text(source_name, index, entry, "group")?.and_then(GroupName::new);

            if let Some(&first) = seen.get(&username) {
                let existing = &students[first];
                if existing.group != group {
                    return Err(OnboardingError::malformed(
                        source_name,
                        format!(
                            "entry {index}: username '{username}' already listed at entry {first} with a different group"
                        ),
                    ));
                }
                warn!(%username, index, first, "Duplicate roster entry dropped");
                continue;
            }

            seen.insert(username.clone(), students.len());
            students.push(Student {
                username,
                name,
                group,
            });
        }

        if students.is_empty() {
            return Err(OnboardingError::malformed(source_name, "no students found"));
        }

        debug!(source = source_name, count = students.len(), "Roster loaded");
        Ok(Self {
            source_name: source_name.to_string(),
            students,
        })
    }

    /// Builds a roster from already-validated students, dropping duplicates.
    pub fn from_students(
        source_name: impl Into<String>,
        students: impl IntoIterator<Item = Student>,
    ) -> Self {
        let mut seen = std::collections::HashSet::new();
        let students = students
            .into_iter()
            .filter(|s| seen.insert(s.username.clone()))
            .collect();
        Self {
            source_name: source_name.into(),
            students,
        }
    }

    /// Returns the label of the input this roster was loaded from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns the students in roster order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Returns the number of students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Returns `true` if the roster has no students.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Merges group assignments from a secondary source.
    ///
    /// Assignments for usernames not on the roster are returned in
    /// [`MergeOutcome::unknown`] and otherwise ignored.
    pub fn merge_groups(
        &mut self,
        assignments: &GroupAssignments,
        mode: MergeMode,
    ) -> MergeOutcome {
        let mut updated = 0;
        for student in &mut self.students {
            let Some(group) = assignments.get(&student.username) else {
                continue;
            };
            let apply = match mode {
                MergeMode::Overwrite => student.group.as_ref() != Some(group),
                MergeMode::FillMissing => student.group.is_none(),
            };
            if apply {
                student.group = Some(group.clone());
                updated += 1;
            }
        }

        let unknown: Vec<Username> = assignments
            .iter()
            .filter(|(u, _)| !self.students.iter().any(|s| &s.username == *u))
            .map(|(u, _)| u.clone())
            .collect();
        for username in &unknown {
            warn!(%username, "Group assignment for a username not on the roster ignored");
        }

        MergeOutcome { updated, unknown }
    }

    /// Groups every student into a team, failing on the first student
    /// without a group.
    pub fn require_groups(&self) -> Result<Vec<DesiredTeam>, OnboardingError> {
        let grouping = self.group_by_team();
        match grouping.missing.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(grouping.teams),
        }
    }

    /// Groups students into teams, collecting one
    /// [`OnboardingError::MissingGroup`] per student without a group.
    ///
    /// Group labels that map to the same slug (`"Team 1"` and `"team-1"`)
    /// become one team named after the first spelling seen. Teams are sorted
    /// by name; members keep roster order.
    pub fn group_by_team(&self) -> Grouping {
        let mut by_slug: BTreeMap<TeamSlug, DesiredTeam> = BTreeMap::new();
        let mut missing = Vec::new();

        for student in &self.students {
            let Some(group) = &student.group else {
                missing.push(OnboardingError::MissingGroup {
                    username: student.username.clone(),
                });
                continue;
            };
            let team = by_slug.entry(group.slug()).or_insert_with(|| DesiredTeam {
                name: group.clone(),
                slug: group.slug(),
                members: Vec::new(),
            });
            if &team.name != group {
                debug!(
                    team = %team.name,
                    alias = %group,
                    "Group labels share a slug; merged into one team"
                );
            }
            team.members.push(student.username.clone());
        }

        let mut teams: Vec<DesiredTeam> = by_slug.into_values().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Grouping { teams, missing }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// A team the roster asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredTeam {
    /// Display name (the group label).
    pub name: GroupName,
    /// Slug GitHub will derive from `name`.
    pub slug: TeamSlug,
    /// Students assigned to the group, in roster order.
    pub members: Vec<Username>,
}

/// Result of [`Roster::group_by_team`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub teams: Vec<DesiredTeam>,
    /// One [`OnboardingError::MissingGroup`] per student without a group.
    pub missing: Vec<OnboardingError>,
}

// ---------------------------------------------------------------------------
// Group assignments
// ---------------------------------------------------------------------------

/// How [`Roster::merge_groups`] treats students that already have a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// The assignment source wins.
    #[default]
    Overwrite,
    /// Only students without a group are updated.
    FillMissing,
}

/// Result of [`Roster::merge_groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of students whose group changed.
    pub updated: usize,
    /// Usernames in the assignment source that are not on the roster.
    pub unknown: Vec<Username>,
}

/// Group labels keyed by username, from a source other than the roster.
///
/// Accepts either an object mapping usernames to groups or an array of
/// `{ "username": ..., "group": ... }` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAssignments {
    entries: Vec<(Username, GroupName)>,
}

impl GroupAssignments {
    /// Loads assignments from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OnboardingError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        Self::from_json_str(&path.display().to_string(), &text)
    }

    /// Parses assignments from JSON text.
    pub fn from_json_str(source_name: &str, text: &str) -> Result<Self, OnboardingError> {
        let value = parse_lenient_json(source_name, text)?;
        let mut assignments = Self::default();

        match value {
            Value::Object(map) => {
                for (index, (raw_user, raw_group)) in map.into_iter().enumerate() {
                    let username = Username::parse(&raw_user).map_err(|e| {
                        OnboardingError::malformed(source_name, format!("entry {index}: {e}"))
                    })?;
                    let mut holder = Map::new();
                    holder.insert("group".to_string(), raw_group);
                    let group = optional_text(source_name, index, &holder, "group")?
                        .and_then(GroupName::new)
                        .ok_or_else(|| {
                            OnboardingError::malformed(
                                source_name,
                                format!("entry {index}: empty group for '{username}'"),
                            )
                        })?;
                    assignments.insert(source_name, index, username, group)?;
                }
            }
            Value::Array(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    let Value::Object(entry) = entry else {
                        return Err(OnboardingError::malformed(
                            source_name,
                            format!("entry {index}: expected an object, found {}", kind_of(entry)),
                        ));
                    };
                    let username = required_username(source_name, index, entry)?;
                    let group = optional_text(source_name, index, entry, "group")?
                        .and_then(GroupName::new)
                        .ok_or_else(|| {
                            OnboardingError::malformed(
                                source_name,
                                format!("entry {index}: missing required key 'group'"),
                            )
                        })?;
                    assignments.insert(source_name, index, username, group)?;
                }
            }
            other => {
                return Err(OnboardingError::malformed(
                    source_name,
                    format!("expected an object or array of assignments, found {}", kind_of(&other)),
                ))
            }
        }

        Ok(assignments)
    }

    fn insert(
        &mut self,
        source_name: &str,
        index: usize,
        username: Username,
        group: GroupName,
    ) -> Result<(), OnboardingError> {
        match self.entries.iter().find(|(u, _)| *u == username) {
            Some((_, existing)) if *existing != group => Err(OnboardingError::malformed(
                source_name,
                format!("entry {index}: conflicting groups for '{username}'"),
            )),
            Some(_) => Ok(()),
            None => {
                self.entries.push((username, group));
                Ok(())
            }
        }
    }

    /// Returns the group assigned to `username`.
    pub fn get(&self, username: &Username) -> Option<&GroupName> {
        self.entries
            .iter()
            .find(|(u, _)| u == username)
            .map(|(_, g)| g)
    }

    /// Iterates over assignments in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&Username, &GroupName)> {
        self.entries.iter().map(|(u, g)| (u, g))
    }

    /// Returns the number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no assignments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
