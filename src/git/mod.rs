//! Git integration layer for roguebox
//!
//! Repository operations go through the system `git` binary. Arguments are
//! passed as an argv vector, never through a shell, so paths and commit
//! messages need no quoting.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::RogueError;
use crate::logging::EventLog;

pub mod bootstrap;

/// Upper bound on paths handed to a single `git add` invocation
const STAGE_BATCH: usize = 256;

/// The command sequence roguebox needs from a version control system
pub trait Vcs {
    /// Initialize a repository at `root` unless one exists; true when created
    fn init_if_absent(&self, root: &Path) -> Result<bool>;

    /// Point `origin` at `url`, replacing any existing `origin`
    fn add_remote(&self, root: &Path, url: &str) -> Result<()>;

    fn stage_all(&self, root: &Path) -> Result<()>;

    fn stage_paths(&self, root: &Path, paths: &[String]) -> Result<()>;

    /// Record a commit; false when git declined (e.g. nothing to commit)
    fn commit(&self, root: &Path, message: &str) -> Result<bool>;

    /// Push `branch` to `origin` with upstream tracking; false on rejection
    fn push(&self, root: &Path, branch: &str) -> Result<bool>;
}

/// `Vcs` backed by the `git` executable
pub struct GitCli<'a> {
    log: &'a EventLog,
}

impl<'a> GitCli<'a> {
    pub fn new(log: &'a EventLog) -> Self {
        Self { log }
    }

    fn run(&self, root: &Path, args: &[&str]) -> Result<Output> {
        let display = render_command(root, args);
        self.log.info("git", &format!("exec: {display}"), &[]);

        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute {display}"))?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            self.log.error(
                "git",
                "non-zero exit",
                &[("code", code.as_str()), ("stderr", stderr.trim())],
            );
        }
        Ok(output)
    }

    /// Paths among `paths` that `.gitignore` rules exclude; git refuses to add them
    fn ignored_paths(&self, root: &Path, paths: &[String]) -> Result<HashSet<String>> {
        let mut args = vec!["check-ignore", "-z", "--"];
        args.extend(paths.iter().map(String::as_str));

        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to execute git -C {} check-ignore", root.display()))?;

        // 0: some paths ignored, 1: none ignored, anything else is fatal
        match output.status.code() {
            Some(0) | Some(1) => {}
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                self.log.error("git", "check-ignore failed", &[("stderr", stderr.trim())]);
                return Err(RogueError::Process {
                    command: format!("git -C {} check-ignore", root.display()),
                    code,
                }
                .into());
            }
        }

        let ignored: HashSet<String> = output
            .stdout
            .split(|byte| *byte == 0)
            .filter(|path| !path.is_empty())
            .map(|path| String::from_utf8_lossy(path).into_owned())
            .collect();
        for path in &ignored {
            self.log.warn("git", &format!("skip gitignored: {path}"), &[]);
        }
        Ok(ignored)
    }

    /// Run and turn a non-zero exit into a `Process` error
    fn run_checked(&self, root: &Path, args: &[&str]) -> Result<()> {
        let output = self.run(root, args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RogueError::Process {
                command: render_command(root, args),
                code: output.status.code(),
            }
            .into())
        }
    }
}

impl Vcs for GitCli<'_> {
    fn init_if_absent(&self, root: &Path) -> Result<bool> {
        if root.join(".git").exists() {
            self.log.info("git", "Repo already initialized", &[]);
            return Ok(false);
        }
        self.run_checked(root, &["init"])?;
        Ok(true)
    }

    fn add_remote(&self, root: &Path, url: &str) -> Result<()> {
        // Missing origin is fine here
        self.run(root, &["remote", "remove", "origin"])?;
        self.run_checked(root, &["remote", "add", "origin", url])
    }

    fn stage_all(&self, root: &Path) -> Result<()> {
        self.run_checked(root, &["add", "-A"])
    }

    fn stage_paths(&self, root: &Path, paths: &[String]) -> Result<()> {
        for batch in paths.chunks(STAGE_BATCH) {
            let ignored = self.ignored_paths(root, batch)?;
            let mut args = vec!["add", "--"];
            args.extend(
                batch
                    .iter()
                    .map(String::as_str)
                    .filter(|path| !ignored.contains(*path)),
            );
            if args.len() > 2 {
                self.run_checked(root, &args)?;
            }
        }
        Ok(())
    }

    fn commit(&self, root: &Path, message: &str) -> Result<bool> {
        Ok(self.run(root, &["commit", "-m", message])?.status.success())
    }

    fn push(&self, root: &Path, branch: &str) -> Result<bool> {
        Ok(self
            .run(root, &["push", "-u", "origin", branch])?
            .status
            .success())
    }
}

/// HTTPS clone URL of a GitHub repository
pub fn remote_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{owner}/{repo}.git")
}

fn render_command(root: &Path, args: &[&str]) -> String {
    let mut rendered = format!("git -C {}", root.display());
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}
