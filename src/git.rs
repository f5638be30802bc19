use std::process::{Command as GitCommand, Stdio};

use crate::error::VersionControlError;

/// The two git operations a run needs.
pub trait VersionControl {
    /// Unified diff of the changes currently staged in the index.
    fn staged_diff(&self) -> Result<String, VersionControlError>;

    /// Run `git commit` with `message` and return its exit status.
    ///
    /// A non-zero status (hook rejection, nothing to commit) is not an
    /// error here; only failing to launch git is.
    fn commit(&self, message: &str) -> Result<i32, VersionControlError>;
}

/// `VersionControl` backed by the `git` executable on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl VersionControl for GitCli {
    fn staged_diff(&self) -> Result<String, VersionControlError> {
        git_output(&["diff", "--cached"])
    }

    fn commit(&self, message: &str) -> Result<i32, VersionControlError> {
        log::debug!("Running git commit with a {} byte message", message.len());

        // Hooks and git's own summary go straight to the user's terminal.
        let status = GitCommand::new("git")
            .args(["commit", "-m", message])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| VersionControlError::Spawn {
                args: "commit".to_string(),
                source,
            })?;

        // Killed by a signal: no code, report a generic failure.
        Ok(status.code().unwrap_or(1))
    }
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String, VersionControlError> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .map_err(|source| VersionControlError::Spawn {
            args: args.join(" "),
            source,
        })?;

    if !output.status.success() {
        return Err(VersionControlError::Failed {
            args: args.join(" "),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
