use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::init_repo::{self, InitRepoArgs};
use super::push_all::{self, PushAllArgs};
use super::scan::{print_summary, scan_workspace};
use super::{Session, visibility_override};
use crate::cli::Output;
use crate::config::Overrides;
use crate::proof::append_proof_of_work;
use crate::scanner::ScanOptions;
use crate::utils::iso_timestamp;

#[derive(Args, Debug, Clone, Default)]
pub struct FullRunArgs {
    /// Directory to import
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Name of the GitHub repository
    #[arg(long, value_name = "NAME")]
    pub repo_name: Option<String>,

    /// Create the repository under this organization
    #[arg(long)]
    pub org: Option<String>,

    /// Create a private repository (default)
    #[arg(long, conflicts_with = "public")]
    pub private: bool,

    /// Create a public repository
    #[arg(long)]
    pub public: bool,

    /// Only initialize locally
    #[arg(long)]
    pub no_remote: bool,

    /// Branch to push (default: main)
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit message (default: dated import message)
    #[arg(long, value_name = "TEXT")]
    pub commit_message: Option<String>,

    /// Include glob (reserved, not applied yet)
    #[arg(long = "include", value_name = "GLOB")]
    pub includes: Vec<String>,

    /// Exclude glob (reserved, not applied yet)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Skip files larger than this many MiB
    #[arg(long, value_name = "MB")]
    pub max_size_mb: Option<u64>,

    /// Keep files that look like secrets
    #[arg(long)]
    pub include_secrets: bool,

    /// Describe every step without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl FullRunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            repo_name: self.repo_name.clone(),
            private: visibility_override(self.private, self.public),
            max_size_mb: self.max_size_mb,
            branch: self.branch.clone(),
        }
    }

    fn init_args(&self) -> InitRepoArgs {
        InitRepoArgs {
            root: self.root.clone(),
            repo_name: self.repo_name.clone(),
            org: self.org.clone(),
            private: self.private,
            public: self.public,
            no_remote: self.no_remote,
            dry_run: self.dry_run,
        }
    }

    fn push_args(&self) -> PushAllArgs {
        PushAllArgs {
            root: self.root.clone(),
            branch: self.branch.clone(),
            commit_message: self.commit_message.clone(),
            dry_run: self.dry_run,
            include_secrets: self.include_secrets,
        }
    }
}

pub async fn execute(args: FullRunArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let session = Session::open(config, &args.overrides(), output)?;
    let settings = &session.settings;
    let root = settings.require_root()?;
    settings.require_repo_name()?;

    output.header("Scan");
    let options = ScanOptions::new(root)
        .with_max_size_mb(settings.max_size_mb)
        .with_include_secrets(args.include_secrets)
        .with_globs(args.includes.clone(), args.excludes.clone());
    let scan = scan_workspace(&options, &session.log)?;
    print_summary(&scan, output);

    output.header("Init");
    init_repo::run(&args.init_args(), &session, output).await?;

    output.header("Push");
    let pushed = push_all::run(&args.push_args(), &session, output).await;

    if args.dry_run {
        output.step(&format!("Would append proof of work to {}", settings.proof_file.display()));
    } else {
        // Recorded even when the push failed
        match append_proof_of_work(&settings.proof_file, &iso_timestamp(), &scan.inventory) {
            Ok(()) => {
                let path = settings.proof_file.display().to_string();
                session.log.info("full-run", "Proof of work appended", &[("path", path.as_str())]);
                output.success(&format!("Proof of work appended to {path}"));
            }
            Err(e) => {
                let detail = format!("{e:#}");
                session.log.warn("full-run", "Could not write proof of work", &[("error", detail.as_str())]);
                output.warning(&format!("Could not write proof of work: {detail}"));
            }
        }
    }

    pushed
}
