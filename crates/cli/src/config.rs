//! Runtime configuration: token discovery and GitHub client settings.

use std::process::Command;

use anyhow::{bail, Context, Result};
use github::GitHubConfig;
use secrecy::SecretString;
use tracing::debug;

/// Secondary token variable used by the `gh` CLI.
const GH_TOKEN_VAR: &str = "GH_TOKEN";

/// Finds a token in order: `--token`/`GITHUB_TOKEN` (handled by clap),
/// `GH_TOKEN`, then `gh auth token`.
pub fn resolve_token(explicit: Option<String>) -> Result<SecretString> {
    let from_env = || std::env::var(GH_TOKEN_VAR).ok();
    let token = non_empty(explicit)
        .or_else(|| non_empty(from_env()))
        .or_else(gh_cli_token);

    match token {
        Some(token) => Ok(SecretString::from(token)),
        None => bail!(
            "no GitHub token found: pass --token, set GITHUB_TOKEN or GH_TOKEN, \
             or log in with `gh auth login`"
        ),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Asks an installed `gh` CLI for its token; any failure means "no token".
fn gh_cli_token() -> Option<String> {
    let output = match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "gh CLI not available");
            return None;
        }
    };
    if !output.status.success() {
        debug!(status = %output.status, "gh auth token failed");
        return None;
    }
    non_empty(String::from_utf8(output.stdout).ok())
}

/// Builds client settings from the resolved token and API URL.
pub fn github_config(token: SecretString, api_url: &str) -> Result<GitHubConfig> {
    let config = GitHubConfig::new(token).with_api_base_url(api_url.trim().trim_end_matches('/'));
    config
        .validate()
        .with_context(|| format!("invalid GitHub API URL '{api_url}'"))?;
    Ok(config)
}
