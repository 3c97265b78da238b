//! org-onboard CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: command-line flags with environment fallbacks
//!    (`.env` is loaded first) and token discovery.
//! 2. **Wire observability**: configure `tracing-subscriber` with a pretty or
//!    JSON layer on stderr and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: build the [`github::GitHubClient`] and
//!    hand it to the [`reconcile`] flows as an [`onboarding::OrgDirectory`].
//! 4. **Report**: print the plan or the applied operations and the summary
//!    line to stdout, and map the outcome to an exit status.
//!
//! ## Exit status
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | Success, including per-item failures unless `--strict` |
//! | 1 | Unrecoverable error (credentials, inaccessible org, malformed input) |
//! | 2 | `--strict` and at least one item failed |

mod args;
mod commands;
mod config;
mod render;
mod telemetry;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use github::GitHubClient;
use onboarding::{RunId, RunReport};
use tracing::{info, info_span, Instrument};

use crate::args::{Cli, Command};

const EXIT_ITEM_FAILURES: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let _telemetry = telemetry::init(cli.log_format);

    let run_id = RunId::new_random();
    let span = info_span!("org_onboard", %run_id);
    let outcome = execute(&cli).instrument(span).await;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = render::write_report(&mut std::io::stdout().lock(), &report) {
        eprintln!("Error: failed to write report: {e}");
        return ExitCode::FAILURE;
    }

    let summary = report.summary();
    info!(
        %run_id,
        ok = summary.ok,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run finished"
    );

    if cli.strict && report.has_failures() {
        ExitCode::from(EXIT_ITEM_FAILURES)
    } else {
        ExitCode::SUCCESS
    }
}

async fn execute(cli: &Cli) -> Result<RunReport> {
    let token = config::resolve_token(cli.token.clone())?;
    let github_config = config::github_config(token, &cli.api_url)?;
    let client = GitHubClient::new(github_config).context("failed to build GitHub client")?;

    let report = match &cli.command {
        Command::Invite(args) => commands::run_invite(&client, args)
            .await
            .context("invite failed")?,
        Command::Teams(args) => commands::run_teams(&client, args)
            .await
            .context("team sync failed")?,
    };
    Ok(report)
}
