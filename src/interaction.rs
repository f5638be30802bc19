//! The generate → review → commit loop.

use anyhow::Result;

use crate::config::RunConfig;
use crate::error::is_cancelled;
use crate::git::VersionControl;
use crate::llm::CompletionProvider;
use crate::ui::{KeyAction, TerminalUi};

/// How a review session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Committed,
    /// `git commit` ran but exited with this status.
    CommitFailed(i32),
    Cancelled,
    /// Nobody could review the message, so it was only printed.
    NotReviewed,
}

#[derive(Debug)]
enum State {
    Generating,
    Presenting(String),
    Editing(String),
    Accepted(String),
}

/// Generate a message, let the user accept, regenerate or edit it, then
/// commit.
///
/// Provider failures are returned as errors and never retried here; the
/// user asks for another attempt with the regenerate key.
pub fn review_and_commit(
    diff: &str,
    config: &RunConfig,
    provider: &dyn CompletionProvider,
    vcs: &dyn VersionControl,
    ui: &mut dyn TerminalUi,
) -> Result<ReviewOutcome> {
    match run_states(diff, config, provider, vcs, ui) {
        Err(err) if is_cancelled(&err) => Ok(ReviewOutcome::Cancelled),
        other => other,
    }
}

fn run_states(
    diff: &str,
    config: &RunConfig,
    provider: &dyn CompletionProvider,
    vcs: &dyn VersionControl,
    ui: &mut dyn TerminalUi,
) -> Result<ReviewOutcome> {
    let mut state = State::Generating;

    loop {
        state = match state {
            State::Generating => {
                ui.start_progress(&format!("Generating commit message with {}...", config.model));
                let generated = provider.generate(diff, config);
                ui.stop_progress();
                State::Presenting(generated?)
            }
            State::Presenting(message) => {
                present(ui, &message);
                if !ui.is_interactive() {
                    ui.println("Not running in a terminal; nothing was committed.");
                    return Ok(ReviewOutcome::NotReviewed);
                }
                match ui.read_action("What next?")? {
                    KeyAction::Accept => State::Accepted(message),
                    KeyAction::Regenerate => {
                        ui.println("Regenerating...");
                        State::Generating
                    }
                    KeyAction::Edit => State::Editing(message),
                    KeyAction::Cancel => return Ok(ReviewOutcome::Cancelled),
                }
            }
            State::Editing(original) => {
                let edited = ui.edit("Commit message", &original)?;
                State::Accepted(edited_or_original(&edited, original))
            }
            State::Accepted(message) => {
                let status = vcs.commit(&message)?;
                return Ok(match status {
                    0 => ReviewOutcome::Committed,
                    code => ReviewOutcome::CommitFailed(code),
                });
            }
        };
    }
}

fn present(ui: &mut dyn TerminalUi, message: &str) {
    ui.println("");
    ui.println("----- Commit Message Preview -----");
    ui.println(message);
    ui.println("----------------------------------");
}

/// Trimmed edit result, or the original when the edit left nothing.
pub fn edited_or_original(edited: &str, original: String) -> String {
    let edited = edited.trim();
    if edited.is_empty() {
        original
    } else {
        edited.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_edit_keeps_original() {
        assert_eq!(edited_or_original("", "feat: x".into()), "feat: x");
        assert_eq!(edited_or_original("  \n\t ", "feat: x".into()), "feat: x");
    }

    #[test]
    fn edit_is_trimmed() {
        assert_eq!(
            edited_or_original("\n fix: y\n\n- detail \n", "feat: x".into()),
            "fix: y\n\n- detail"
        );
    }
}
