//! Team flow: one team per roster group, students as members, instructors as
//! maintainers of every team.

use onboarding::{
    plan_teams, OnboardingError, OrgDirectory, OrgName, Roster, RunReport, TeamPrivacy, Username,
};
use tracing::{info, instrument, warn};

use crate::apply::{apply_plan, ApplySettings};
use crate::snapshot;

/// Options for [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamOptions {
    /// Compute and report the plan without mutating calls.
    pub dry_run: bool,
    /// Visibility of created teams.
    pub privacy: TeamPrivacy,
    /// Description given to created teams.
    pub description: Option<String>,
}

/// Runs the team flow.
///
/// Students without a group are reported as
/// [`OnboardingError::MissingGroup`] (one each) and left out; everyone else is
/// processed. Existing teams are matched by slug or name and never recreated.
#[instrument(
    skip_all,
    fields(
        org = %org,
        students = roster.len(),
        instructors = instructors.len(),
        dry_run = options.dry_run
    )
)]
pub async fn run(
    directory: &dyn OrgDirectory,
    org: &OrgName,
    roster: &Roster,
    instructors: &[Username],
    options: &TeamOptions,
) -> Result<RunReport, OnboardingError> {
    let mut report = RunReport::new(options.dry_run);

    snapshot::check_access(directory, org).await?;

    let grouping = roster.group_by_team();
    for err in &grouping.missing {
        warn!(error = %err, "Student skipped");
    }
    report.failures.extend(grouping.missing);

    let observed = snapshot::fetch_teams(directory, org, &grouping.teams).await?;
    report.plan = plan_teams(&grouping.teams, instructors, &observed);
    info!(
        teams = grouping.teams.len(),
        operations = report.plan.operations.len(),
        skipped = report.plan.skipped.len(),
        "Team plan computed"
    );

    if !options.dry_run {
        let settings = ApplySettings {
            team_privacy: options.privacy,
            team_description: options.description.clone(),
            ..ApplySettings::default()
        };
        apply_plan(directory, org, &settings, &mut report).await?;
    }

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use onboarding::{DirectoryErrorKind, TeamRole};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{Call, FakeDirectory};

    fn user(name: &str) -> Username {
        Username::parse(name).unwrap()
    }

    fn org() -> OrgName {
        OrgName::new("DS-223-2025-Fall").unwrap()
    }

    fn roster(json: &str) -> Roster {
        Roster::from_json_str("test", json).unwrap()
    }

    fn real_run() -> TeamOptions {
        TeamOptions::default()
    }

    #[tokio::test]
    async fn creates_team_and_adds_students_and_instructor() {
        let directory = FakeDirectory::new();
        let roster = roster(
            r#"[{"username":"alice","group":"team1"},{"username":"bob","group":"team1"}]"#,
        );

        let report = run(&directory, &org(), &roster, &[user("prof")], &real_run())
            .await
            .unwrap();

        let creates: Vec<_> = directory
            .mutating_calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateTeam { .. }))
            .collect();
        assert_eq!(
            creates,
            vec![Call::CreateTeam {
                name: "team1".to_string()
            }]
        );
        assert_eq!(
            directory.team_roles("team1"),
            vec![
                ("alice".to_string(), TeamRole::Member),
                ("bob".to_string(), TeamRole::Member),
                ("prof".to_string(), TeamRole::Maintainer),
            ]
        );
        assert_eq!(report.applied.len(), 4);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn missing_group_is_reported_once_and_others_processed() {
        let directory = FakeDirectory::new();
        let roster = roster(
            r#"[
                {"username":"alice","group":"team1"},
                {"username":"dave"},
                {"username":"bob","group":"team2"}
            ]"#,
        );

        let report = run(&directory, &org(), &roster, &[], &real_run())
            .await
            .unwrap();

        assert_eq!(
            report.failures,
            vec![OnboardingError::MissingGroup {
                username: user("dave")
            }]
        );
        assert_eq!(directory.team_roles("team1").len(), 1);
        assert_eq!(directory.team_roles("team2").len(), 1);
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let directory = FakeDirectory::new();
        let roster = roster(
            r#"[{"username":"alice","group":"team1"},{"username":"bob","group":"team2"}]"#,
        );
        let instructors = [user("prof"), user("ta")];

        run(&directory, &org(), &roster, &instructors, &real_run())
            .await
            .unwrap();
        let calls_after_first = directory.mutating_calls().len();

        let second = run(&directory, &org(), &roster, &instructors, &real_run())
            .await
            .unwrap();
        assert_eq!(directory.mutating_calls().len(), calls_after_first);
        assert!(second.plan.is_empty());
    }

    #[tokio::test]
    async fn existing_member_instructor_is_promoted() {
        let directory = FakeDirectory::new()
            .with_team("team1", &[("alice", TeamRole::Member), ("prof", TeamRole::Member)]);
        let roster = roster(r#"[{"username":"alice","group":"team1"}]"#);

        run(&directory, &org(), &roster, &[user("prof")], &real_run())
            .await
            .unwrap();

        assert_eq!(
            directory.mutating_calls(),
            vec![Call::SetMembership {
                team: "team1".to_string(),
                username: "prof".to_string(),
                role: TeamRole::Maintainer,
            }]
        );
    }

    #[tokio::test]
    async fn dry_run_makes_no_mutating_calls() {
        let directory = FakeDirectory::new().with_team("team1", &[]);
        let roster = roster(
            r#"[{"username":"alice","group":"team1"},{"username":"bob","group":"team2"}]"#,
        );
        let options = TeamOptions {
            dry_run: true,
            ..real_run()
        };

        let report = run(&directory, &org(), &roster, &[user("prof")], &options)
            .await
            .unwrap();

        assert!(directory.mutating_calls().is_empty());
        // team1: add prof + alice; team2: create + add prof + bob
        assert_eq!(report.plan.operations.len(), 5);
        assert!(report.applied.is_empty());
    }

    #[tokio::test]
    async fn failed_team_creation_skips_its_members_only() {
        let directory = FakeDirectory::new()
            .fail_create_team("team1", DirectoryErrorKind::Validation);
        let roster = roster(
            r#"[{"username":"alice","group":"team1"},{"username":"bob","group":"team2"}]"#,
        );

        let report = run(&directory, &org(), &roster, &[], &real_run())
            .await
            .unwrap();

        // create failure + the skipped add for alice
        assert_eq!(report.failures.len(), 2);
        assert_eq!(
            directory.team_roles("team2"),
            vec![("bob".to_string(), TeamRole::Member)]
        );
    }

    #[tokio::test]
    async fn membership_failure_is_collected() {
        let directory = FakeDirectory::new()
            .fail_membership("bob", DirectoryErrorKind::NotFound);
        let roster = roster(
            r#"[{"username":"alice","group":"team1"},{"username":"bob","group":"team1"},{"username":"carol","group":"team1"}]"#,
        );

        let report = run(&directory, &org(), &roster, &[], &real_run())
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            directory.team_roles("team1"),
            vec![
                ("alice".to_string(), TeamRole::Member),
                ("carol".to_string(), TeamRole::Member),
            ]
        );
    }

    #[tokio::test]
    async fn members_follow_the_slug_github_assigned() {
        let directory = FakeDirectory::new().assign_slug("Team 1", "team-1-fall");
        let roster = roster(r#"[{"username":"alice","group":"Team 1"}]"#);

        let report = run(&directory, &org(), &roster, &[], &real_run())
            .await
            .unwrap();

        assert!(!report.has_failures());
        assert_eq!(
            directory.team_roles("team-1-fall"),
            vec![("alice".to_string(), TeamRole::Member)]
        );
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let directory = FakeDirectory::new().fail_listing(DirectoryErrorKind::Transient);
        let roster = roster(r#"[{"username":"alice","group":"team1"}]"#);

        let err = run(&directory, &org(), &roster, &[], &real_run())
            .await
            .unwrap_err();

        assert!(matches!(err, OnboardingError::ApiUnavailable { .. }));
        assert!(directory.mutating_calls().is_empty());
    }
}
