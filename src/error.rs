//! Error kinds and process exit codes
//!
//! Low-level failures are described by [`RogueError`]. Command handlers work
//! with `anyhow` and, when a step fails in a way that must surface as a
//! distinct exit code, wrap the cause in a [`CommandFailure`] tagged with the
//! [`FailureSite`] where it happened.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RogueError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no GitHub token in GITHUB_TOKEN and the gh CLI is not installed")]
    RemoteAuth,

    #[error("`{command}` exited with status {}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Process { command: String, code: Option<i32> },

    #[error("could not determine the GitHub owner (pass --org, set GITHUB_USER, or log in with gh)")]
    OwnerUnresolved,

    #[error("GitHub API returned {status}: {body}")]
    Http { status: u16, body: String },
}

impl RogueError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Where a command aborted; each site has its own exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSite {
    Scan,
    LocalInit,
    RemoteCreate,
    RemoteAttach,
    Stage,
    Push,
}

impl FailureSite {
    pub fn exit_code(self) -> u8 {
        match self {
            FailureSite::Scan => 2,
            FailureSite::LocalInit => 3,
            FailureSite::RemoteCreate => 4,
            FailureSite::RemoteAttach => 5,
            FailureSite::Stage => 6,
            FailureSite::Push => 8,
        }
    }
}

impl fmt::Display for FailureSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureSite::Scan => "scan",
            FailureSite::LocalInit => "local repository init",
            FailureSite::RemoteCreate => "remote repository creation",
            FailureSite::RemoteAttach => "remote attach",
            FailureSite::Stage => "staging",
            FailureSite::Push => "push",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{site} failed")]
pub struct CommandFailure {
    pub site: FailureSite,
    #[source]
    pub source: anyhow::Error,
}

impl CommandFailure {
    pub fn new(site: FailureSite, source: impl Into<anyhow::Error>) -> Self {
        Self {
            site,
            source: source.into(),
        }
    }
}

/// Map any command error to the process exit code
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CommandFailure>()
        .map(|failure| failure.site.exit_code())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_per_site() {
        assert_eq!(FailureSite::Scan.exit_code(), 2);
        assert_eq!(FailureSite::LocalInit.exit_code(), 3);
        assert_eq!(FailureSite::RemoteCreate.exit_code(), 4);
        assert_eq!(FailureSite::RemoteAttach.exit_code(), 5);
        assert_eq!(FailureSite::Stage.exit_code(), 6);
        assert_eq!(FailureSite::Push.exit_code(), 8);
    }

    #[test]
    fn test_exit_code_for_wrapped_failure() {
        let err: anyhow::Error = CommandFailure::new(FailureSite::Push, RogueError::Process {
            command: "git push -u origin main".to_string(),
            code: Some(128),
        })
        .into();
        assert_eq!(exit_code_for(&err), 8);

        assert_eq!(
            format!("{err:#}"),
            "push failed: `git push -u origin main` exited with status 128"
        );

        let plain = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&plain), 1);
    }

    #[test]
    fn test_process_error_message() {
        let err = RogueError::Process {
            command: "git add -A".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "`git add -A` exited with status signal");
    }
}
