//! Command handlers: input loading and flow dispatch.

use onboarding::{
    GroupAssignments, MergeMode, OnboardingError, OrgDirectory, OrgName, Roster, RunReport,
    Username,
};
use reconcile::{invite, teams, InviteOptions, TeamOptions};
use tracing::info;

use crate::args::{InviteArgs, RosterArgs, TeamsArgs};

/// Source name used in errors about `--instructors`.
const INSTRUCTORS_SOURCE: &str = "--instructors";

pub async fn run_invite(
    directory: &dyn OrgDirectory,
    args: &InviteArgs,
) -> Result<RunReport, OnboardingError> {
    let (org, roster) = load_inputs(&args.roster)?;
    info!(%org, students = roster.len(), role = %args.role, "Inviting students");

    let options = InviteOptions {
        dry_run: args.roster.dry_run,
        role: args.role,
    };
    invite::run(directory, &org, &roster, &options).await
}

pub async fn run_teams(
    directory: &dyn OrgDirectory,
    args: &TeamsArgs,
) -> Result<RunReport, OnboardingError> {
    let instructors = parse_instructors(&args.instructors)?;
    let (org, roster) = load_inputs(&args.roster)?;
    info!(%org, students = roster.len(), instructors = instructors.len(), "Syncing teams");

    let options = TeamOptions {
        dry_run: args.roster.dry_run,
        privacy: args.privacy,
        description: args.description.clone(),
    };
    teams::run(directory, &org, &roster, &instructors, &options).await
}

/// Reads the roster and merges optional group assignments into it.
///
/// Runs before any API call so malformed input never reaches GitHub.
fn load_inputs(args: &RosterArgs) -> Result<(OrgName, Roster), OnboardingError> {
    let org = OrgName::new(&args.org)
        .ok_or_else(|| OnboardingError::malformed("--org", "organization name is empty"))?;

    let mut roster = Roster::load(&args.file)?;
    if let Some(path) = &args.groups {
        let assignments = GroupAssignments::load(path)?;
        let mode = MergeMode::from(args.groups_mode);
        let outcome = roster.merge_groups(&assignments, mode);
        info!(
            assignments = assignments.len(),
            updated = outcome.updated,
            unknown = outcome.unknown.len(),
            ?mode,
            "Group assignments merged"
        );
    }
    Ok((org, roster))
}

/// Parses a comma-separated instructor list.
///
/// Whitespace and a leading `@` are stripped, empty entries are ignored, and
/// duplicates collapse to the first spelling.
pub fn parse_instructors(raw: &str) -> Result<Vec<Username>, OnboardingError> {
    let mut instructors: Vec<Username> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let username = Username::parse(entry).map_err(|e| {
            OnboardingError::malformed(INSTRUCTORS_SOURCE, format!("'{entry}': {e}"))
        })?;
        if !instructors.contains(&username) {
            instructors.push(username);
        }
    }
    Ok(instructors)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use onboarding::GroupName;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::args::GroupsMode;

    fn names(users: &[Username]) -> Vec<&str> {
        users.iter().map(Username::as_str).collect()
    }

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn roster_args(file: PathBuf, groups: Option<PathBuf>, mode: GroupsMode) -> RosterArgs {
        RosterArgs {
            org: "acme".to_string(),
            file,
            dry_run: true,
            groups,
            groups_mode: mode,
        }
    }

    #[test]
    fn instructors_are_trimmed_and_deduplicated() {
        let instructors = parse_instructors(" prof, @ta ,, Prof ,").unwrap();
        assert_eq!(names(&instructors), vec!["prof", "ta"]);
    }

    #[test]
    fn empty_instructor_list_is_allowed() {
        assert!(parse_instructors(" , ").unwrap().is_empty());
    }

    #[test]
    fn invalid_instructor_is_malformed_input() {
        let err = parse_instructors("prof,not valid").unwrap_err();
        assert!(matches!(err, OnboardingError::MalformedInput { .. }));
        assert!(err.to_string().contains("not valid"));
    }

    #[test]
    fn groups_file_fills_only_missing_groups() {
        let roster = json_file(
            r#"[{"username": "alice", "group": "team1"}, {"username": "bob"}]"#,
        );
        let groups = json_file(r#"{"alice": "team9", "bob": "team2"}"#);

        let args = roster_args(
            roster.path().to_path_buf(),
            Some(groups.path().to_path_buf()),
            GroupsMode::Fill,
        );
        let (org, roster) = load_inputs(&args).unwrap();

        assert_eq!(org.as_str(), "acme");
        let assigned: Vec<Option<GroupName>> =
            roster.students().iter().map(|s| s.group.clone()).collect();
        assert_eq!(assigned, vec![GroupName::new("team1"), GroupName::new("team2")]);
    }

    #[test]
    fn missing_roster_file_is_malformed_input() {
        let args = roster_args(
            PathBuf::from("/nonexistent/github_usernames.json"),
            None,
            GroupsMode::Overwrite,
        );
        assert!(matches!(
            load_inputs(&args),
            Err(OnboardingError::MalformedInput { .. })
        ));
    }
}
