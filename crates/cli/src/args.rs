//! Command-line surface of `org-onboard`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use onboarding::{MergeMode, OrgRole, TeamPrivacy};

/// Onboard a class roster into a GitHub organization.
#[derive(Debug, Parser)]
#[command(name = "org-onboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GitHub token; falls back to GH_TOKEN and then `gh auth token`.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API base URL (GitHub Enterprise: https://HOST/api/v3).
    #[arg(
        long,
        global = true,
        env = "GITHUB_API_URL",
        default_value = github::DEFAULT_API_URL
    )]
    pub api_url: String,

    /// Log output format (logs go to stderr).
    #[arg(
        long,
        global = true,
        env = "ORG_ONBOARD_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Exit with status 2 when any item failed.
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Invite every roster student who is not yet a member or invited.
    Invite(InviteArgs),

    /// Create one team per roster group and fill it with students and instructors.
    Teams(TeamsArgs),
}

/// Options shared by both commands.
#[derive(Debug, Args)]
pub struct RosterArgs {
    /// Organization login.
    #[arg(long)]
    pub org: String,

    /// Roster file: JSON array of {username, group?, name?}.
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Print what would change without calling mutating endpoints.
    #[arg(long)]
    pub dry_run: bool,

    /// Group assignments to merge into the roster before running.
    #[arg(long, value_name = "PATH")]
    pub groups: Option<PathBuf>,

    /// How group assignments treat students that already have a group.
    #[arg(long, value_enum, default_value_t = GroupsMode::Overwrite, requires = "groups")]
    pub groups_mode: GroupsMode,
}

#[derive(Debug, Args)]
pub struct InviteArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Role granted by the invitation (direct_member or admin).
    #[arg(long, default_value_t = OrgRole::DirectMember)]
    pub role: OrgRole,
}

#[derive(Debug, Args)]
pub struct TeamsArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Comma-separated instructor usernames, made maintainers of every team.
    #[arg(long, value_name = "A,B,C")]
    pub instructors: String,

    /// Visibility of newly created teams (closed or secret).
    #[arg(long, default_value_t = TeamPrivacy::Closed)]
    pub privacy: TeamPrivacy,

    /// Description given to newly created teams.
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupsMode {
    /// Assignments replace existing groups.
    Overwrite,
    /// Assignments only fill students without a group.
    Fill,
}

impl From<GroupsMode> for MergeMode {
    fn from(mode: GroupsMode) -> Self {
        match mode {
            GroupsMode::Overwrite => MergeMode::Overwrite,
            GroupsMode::Fill => MergeMode::FillMissing,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_teams_command() {
        let cli = Cli::try_parse_from([
            "org-onboard",
            "--strict",
            "teams",
            "--org",
            "DS-223-2025-Fall",
            "--file",
            "github_usernames.json",
            "--instructors",
            "prof,@ta",
            "--privacy",
            "secret",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.strict);
        let Command::Teams(args) = cli.command else {
            panic!("expected teams command");
        };
        assert_eq!(args.roster.org, "DS-223-2025-Fall");
        assert!(args.roster.dry_run);
        assert_eq!(args.instructors, "prof,@ta");
        assert_eq!(args.privacy, TeamPrivacy::Secret);
    }

    #[test]
    fn invite_defaults_to_direct_member() {
        let cli = Cli::try_parse_from([
            "org-onboard",
            "invite",
            "--org",
            "acme",
            "--file",
            "roster.json",
        ])
        .unwrap();
        let Command::Invite(args) = cli.command else {
            panic!("expected invite command");
        };
        assert_eq!(args.role, OrgRole::DirectMember);
        assert_eq!(args.roster.groups, None);
    }

    #[test]
    fn groups_mode_requires_groups_file() {
        let result = Cli::try_parse_from([
            "org-onboard",
            "invite",
            "--org",
            "acme",
            "--file",
            "roster.json",
            "--groups-mode",
            "fill",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "org-onboard",
            "invite",
            "--org",
            "acme",
            "--file",
            "roster.json",
            "--role",
            "owner",
        ]);
        assert!(result.is_err());
    }
}
