use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::Session;
use super::scan::scan_workspace;
use crate::cli::Output;
use crate::config::Overrides;
use crate::error::{CommandFailure, FailureSite};
use crate::git::{GitCli, Vcs};
use crate::logging::EventLog;
use crate::plan::{ChunkPlan, PushPolicy, SkippedFile, plan_chunks};
use crate::scanner::{Inventory, ScanOptions};
use crate::utils::{MIB, format_file_size, iso_date};

const CHUNK_SUFFIX: &str = " [chunk]";

#[derive(Args, Debug, Clone, Default)]
pub struct PushAllArgs {
    /// Repository working tree
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Branch to push (default: main)
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit message (default: dated import message)
    #[arg(long, value_name = "TEXT")]
    pub commit_message: Option<String>,

    /// Report the push mode and planned chunks without touching the repository
    #[arg(long)]
    pub dry_run: bool,

    /// Keep files that look like secrets when planning chunks
    #[arg(long)]
    pub include_secrets: bool,
}

impl PushAllArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            branch: self.branch.clone(),
            ..Default::default()
        }
    }
}

/// How the workspace is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Single,
    Chunked,
}

impl PushMode {
    pub fn describe(self, policy: &PushPolicy) -> String {
        match self {
            PushMode::Single => "single".to_string(),
            PushMode::Chunked => format!("chunked (~{}MB)", policy.chunk_ceiling / MIB),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub mode: PushMode,
    /// Commits git accepted
    pub commits: usize,
    pub skipped: Vec<SkippedFile>,
}

pub async fn execute(args: PushAllArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let session = Session::open(config, &args.overrides(), output)?;
    run(&args, &session, output).await
}

/// Shared with `full-run`, which already holds a session
pub async fn run(args: &PushAllArgs, session: &Session, output: &Output) -> Result<()> {
    let settings = &session.settings;
    let root = settings.require_root()?;
    let message = args.commit_message.clone().filter(|m| !m.trim().is_empty()).unwrap_or_else(default_commit_message);
    let policy = settings.push_policy();
    let log = &session.log;

    let options = ScanOptions::new(root)
        .with_max_size_mb(settings.max_size_mb)
        .with_include_secrets(args.include_secrets);
    let inventory = scan_workspace(&options, log)
        .map_err(|e| CommandFailure::new(FailureSite::Stage, e))?
        .inventory;

    if args.dry_run {
        describe(&inventory, &policy, &message, &settings.branch, log, output);
        return Ok(());
    }

    let git = GitCli::new(log);
    let outcome = push_inventory(root, &inventory, &policy, &message, &settings.branch, &git, log)?;

    for skipped in &outcome.skipped {
        output.warning(&format!("{} not pushed ({})", skipped.path, format_file_size(skipped.size)));
    }
    output.success(&format!(
        "Pushed {} to origin/{} ({}, {} commit{})",
        root.display(),
        settings.branch,
        outcome.mode.describe(&policy),
        outcome.commits,
        if outcome.commits == 1 { "" } else { "s" }
    ));
    Ok(())
}

/// `chore(import): add Workshop sources & docs (YYYY-MM-DD)` for today
pub fn default_commit_message() -> String {
    format!("chore(import): add Workshop sources & docs ({})", iso_date())
}

/// Stage, commit and push a scanned workspace
///
/// Above the policy trigger every planned chunk is staged by path and
/// committed on its own. A failed commit is tolerated; the push is always
/// attempted.
pub fn push_inventory<V: Vcs>(
    root: &Path,
    inventory: &Inventory,
    policy: &PushPolicy,
    message: &str,
    branch: &str,
    vcs: &V,
    log: &EventLog,
) -> Result<PushOutcome> {
    let mut outcome = PushOutcome {
        mode: PushMode::Single,
        commits: 0,
        skipped: Vec::new(),
    };

    if policy.is_chunked(inventory.total_size()) {
        outcome.mode = PushMode::Chunked;
        let ChunkPlan { chunks, skipped } = plan_chunks(inventory, policy.chunk_ceiling);

        for file in &skipped {
            log.warn(
                "push-all",
                &format!("skip >{}MB: {}", policy.chunk_ceiling / MIB, file.path),
                &[],
            );
        }

        let chunk_message = format!("{message}{CHUNK_SUFFIX}");
        let total = chunks.len().to_string();
        for (index, chunk) in chunks.iter().enumerate() {
            let number = (index + 1).to_string();
            let size = chunk.size.to_string();
            log.info(
                "push-all",
                "Committing chunk",
                &[("chunk", number.as_str()), ("of", total.as_str()), ("bytes", size.as_str())],
            );

            vcs.stage_paths(root, &chunk.paths)
                .map_err(|e| stage_failure(log, e))?;
            if commit(vcs, root, &chunk_message, log)? {
                outcome.commits += 1;
            }
        }
        outcome.skipped = skipped;
    } else {
        vcs.stage_all(root).map_err(|e| stage_failure(log, e))?;
        if commit(vcs, root, message, log)? {
            outcome.commits += 1;
        }
    }

    let pushed = vcs.push(root, branch).map_err(|e| push_failure(log, e))?;
    if !pushed {
        return Err(push_failure(log, anyhow::anyhow!("git push to origin/{branch} was rejected")));
    }

    log.info("push-all", "Pushed successfully", &[("branch", branch)]);
    Ok(outcome)
}

fn commit<V: Vcs>(vcs: &V, root: &Path, message: &str, log: &EventLog) -> Result<bool> {
    // Nothing to commit is not fatal
    match vcs.commit(root, message) {
        Ok(true) => Ok(true),
        Ok(false) => {
            log.warn(
                "push-all",
                "Commit failed (possibly nothing to commit); will attempt push anyway",
                &[],
            );
            Ok(false)
        }
        Err(e) => {
            let detail = format!("{e:#}");
            log.warn("push-all", "Commit could not run", &[("error", detail.as_str())]);
            Ok(false)
        }
    }
}

fn stage_failure(log: &EventLog, source: anyhow::Error) -> anyhow::Error {
    log.error("push-all", "Failed to stage files", &[]);
    CommandFailure::new(FailureSite::Stage, source).into()
}

fn push_failure(log: &EventLog, source: anyhow::Error) -> anyhow::Error {
    log.error("push-all", "Failed to push", &[]);
    CommandFailure::new(FailureSite::Push, source).into()
}

fn describe(inventory: &Inventory, policy: &PushPolicy, message: &str, branch: &str, log: &EventLog, output: &Output) {
    let mode = if policy.is_chunked(inventory.total_size()) {
        PushMode::Chunked
    } else {
        PushMode::Single
    };
    let mode_text = mode.describe(policy);
    log.info(
        "push-all",
        "[dry-run] Would commit and push",
        &[("message", message), ("branch", branch), ("mode", mode_text.as_str())],
    );

    output.step(&format!(
        "Would push {} files ({}) to origin/{} as {}",
        inventory.len(),
        format_file_size(inventory.total_size()),
        branch,
        mode_text
    ));
    output.key_value("message", message, false);

    if mode == PushMode::Chunked {
        let plan = plan_chunks(inventory, policy.chunk_ceiling);
        for (index, chunk) in plan.chunks.iter().enumerate() {
            output.list_item(&format!(
                "chunk {}: {} files, {}",
                index + 1,
                chunk.paths.len(),
                format_file_size(chunk.size)
            ));
        }
        for file in &plan.skipped {
            output.warning(&format!("{} would be skipped ({})", file.path, format_file_size(file.size)));
        }
        output.key_value(
            "planned",
            &format!("{} files, {}", plan.planned_files(), format_file_size(plan.planned_bytes())),
            true,
        );
    }
}
