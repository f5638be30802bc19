//! One run of the tool: reset, or resolve → diff → review → commit.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli_args::Cli;
use crate::config::Environment;
use crate::error::{is_cancelled, ConfigError, ProviderError};
use crate::git::VersionControl;
use crate::interaction::{review_and_commit, ReviewOutcome};
use crate::llm::{ModelInventory, ProviderFactory};
use crate::preferences::PreferenceStore;
use crate::setup::{resolve_run_config, ResolveOptions};
use crate::ui::TerminalUi;

/// How a run ended, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    /// `git commit` exited non-zero; its status is forwarded.
    CommitFailed(i32),
    Cancelled,
    /// No terminal: the message was printed but not committed.
    NotReviewed,
    NothingStaged,
    SettingsReset { removed: bool },
    ResetAborted,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::CommitFailed(code) => *code,
            _ => 0,
        }
    }
}

impl From<ReviewOutcome> for Outcome {
    fn from(outcome: ReviewOutcome) -> Self {
        match outcome {
            ReviewOutcome::Committed => Outcome::Committed,
            ReviewOutcome::CommitFailed(code) => Outcome::CommitFailed(code),
            ReviewOutcome::Cancelled => Outcome::Cancelled,
            ReviewOutcome::NotReviewed => Outcome::NotReviewed,
        }
    }
}

/// The side-effecting pieces a run talks to.
pub struct Collaborators<'a> {
    pub store: &'a dyn PreferenceStore,
    pub ui: &'a mut dyn TerminalUi,
    pub vcs: &'a dyn VersionControl,
    pub inventory: &'a dyn ModelInventory,
    pub providers: &'a dyn ProviderFactory,
}

pub fn run(cli: &Cli, env: &Environment, deps: Collaborators<'_>) -> Result<Outcome> {
    let Collaborators {
        store,
        ui,
        vcs,
        inventory,
        providers,
    } = deps;

    let result = if cli.reset {
        reset_settings(store, ui, cli.yes)
    } else {
        commit_staged(cli, env, store, ui, vcs, inventory, providers)
    };

    match result {
        Err(err) if is_cancelled(&err) => {
            ui.println(&"Cancelled.".dimmed().to_string());
            Ok(Outcome::Cancelled)
        }
        Ok(Outcome::Cancelled) => {
            ui.println(&"Cancelled.".dimmed().to_string());
            Ok(Outcome::Cancelled)
        }
        other => other,
    }
}

fn reset_settings(
    store: &dyn PreferenceStore,
    ui: &mut dyn TerminalUi,
    assume_yes: bool,
) -> Result<Outcome> {
    if !assume_yes {
        let question = format!("Delete saved settings at {}?", store.location());
        if !ui.confirm(&question, false)? {
            ui.println("Reset aborted.");
            return Ok(Outcome::ResetAborted);
        }
    }

    let removed = store.delete()?;
    if removed {
        ui.println(&format!("Deleted saved settings at {}", store.location()));
    } else {
        ui.println("No saved settings to delete.");
    }
    Ok(Outcome::SettingsReset { removed })
}

fn commit_staged(
    cli: &Cli,
    env: &Environment,
    store: &dyn PreferenceStore,
    ui: &mut dyn TerminalUi,
    vcs: &dyn VersionControl,
    inventory: &dyn ModelInventory,
    providers: &dyn ProviderFactory,
) -> Result<Outcome> {
    let saved = store.read();
    let resolution = resolve_run_config(&ResolveOptions::from(cli), env, &saved, ui, inventory)?;
    let config = &resolution.config;

    if resolution.persist {
        match store.write(&resolution.preferences()) {
            Ok(()) => log::debug!("Saved settings to {}", store.location()),
            Err(e) => log::warn!("Could not save settings: {e:#}"),
        }
    }

    ui.println(&format!(
        "{} {} · {}",
        "Using".dimmed(),
        config.target.label().bold(),
        config.model
    ));

    let diff = vcs.staged_diff().context("failed to read the staged diff")?;
    if diff.trim().is_empty() {
        ui.println("No staged changes found. Stage files with `git add` first.");
        return Ok(Outcome::NothingStaged);
    }
    log::debug!("Staged diff is {} bytes", diff.len());

    let client = providers.client_for(config);
    let outcome = review_and_commit(&diff, config, client.as_ref(), vcs, ui)?;
    Ok(outcome.into())
}

/// One-line message for an error that reached the top level.
///
/// Provider and configuration errors are shown as their own message;
/// anything else gets the full context chain.
pub fn error_message(err: &anyhow::Error) -> String {
    if let Some(provider) = err.downcast_ref::<ProviderError>() {
        return provider.to_string();
    }
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return config.to_string();
    }
    format!("Error: {err:#}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpenAiError;

    #[test]
    fn only_failed_commits_exit_non_zero() {
        assert_eq!(Outcome::Committed.exit_code(), 0);
        assert_eq!(Outcome::Cancelled.exit_code(), 0);
        assert_eq!(Outcome::NothingStaged.exit_code(), 0);
        assert_eq!(Outcome::NotReviewed.exit_code(), 0);
        assert_eq!(Outcome::SettingsReset { removed: false }.exit_code(), 0);
        assert_eq!(Outcome::CommitFailed(128).exit_code(), 128);
    }

    #[test]
    fn provider_errors_print_verbatim() {
        let err: anyhow::Error = ProviderError::from(OpenAiError::Status {
            status: 429,
            body: "rate limited".into(),
        })
        .into();
        assert_eq!(error_message(&err), "OpenAI API error: HTTP 429 - rate limited");
    }

    #[test]
    fn other_errors_keep_their_context() {
        let err = anyhow::anyhow!("disk full").context("failed to write settings");
        assert_eq!(error_message(&err), "Error: failed to write settings: disk full");
    }
}
