use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::{Session, visibility_override};
use crate::cli::Output;
use crate::config::Overrides;
use crate::error::{CommandFailure, FailureSite};
use crate::git::{GitCli, Vcs, bootstrap, remote_url};
use crate::logging::EventLog;
use crate::remote::{
    EnvVar, ExplicitOrg, GitHub, OwnerSource, RemoteCreator, create_remote, default_owner_sources, read_github_token,
    resolve_owner,
};

#[derive(Args, Debug, Clone, Default)]
pub struct InitRepoArgs {
    /// Directory to turn into a repository
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

    /// Describe the actions without performing them
    #[arg(long)]
    pub dry_run: bool,
}

impl InitRepoArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            repo_name: self.repo_name.clone(),
            private: visibility_override(self.private, self.public),
            ..Default::default()
        }
    }
}

/// Everything `init_repository` needs to know about the target
#[derive(Debug, Clone)]
pub struct InitRequest<'a> {
    pub root: &'a Path,
    pub repo_name: &'a str,
    pub org: Option<&'a str>,
    pub private: bool,
    pub no_remote: bool,
}

pub async fn execute(args: InitRepoArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let session = Session::open(config, &args.overrides(), output)?;
    run(&args, &session, output).await
}

/// Shared with `full-run`, which already holds a session
pub async fn run(args: &InitRepoArgs, session: &Session, output: &Output) -> Result<()> {
    let request = InitRequest {
        root: session.settings.require_root()?,
        repo_name: session.settings.require_repo_name()?,
        org: args.org.as_deref(),
        private: session.settings.private,
        no_remote: args.no_remote,
    };

    if args.dry_run {
        describe(&request, &session.log, output);
        return Ok(());
    }

    let git = GitCli::new(&session.log);
    let github = GitHub::new(&session.log);
    let token = read_github_token();
    let owners = default_owner_sources(request.org);

    init_repository(&request, &git, &github, token.as_deref(), &owners, &session.log).await?;

    if request.no_remote {
        output.success(&format!("Initialized {}", request.root.display()));
    } else {
        output.success(&format!("Initialized {} with remote {}", request.root.display(), request.repo_name));
    }
    Ok(())
}

/// Local init, remote creation, then `origin`; each failure carries its own exit code
pub async fn init_repository<V: Vcs, R: RemoteCreator>(
    request: &InitRequest<'_>,
    vcs: &V,
    remote: &R,
    token: Option<&str>,
    owners: &[Box<dyn OwnerSource>],
    log: &EventLog,
) -> Result<()> {
    let created = vcs
        .init_if_absent(request.root)
        .map_err(|e| failure(log, FailureSite::LocalInit, "Failed to initialize repo", e))?;

    if created {
        let written = bootstrap::write_defaults(request.root)
            .map_err(|e| failure(log, FailureSite::LocalInit, "Failed to write default files", e))?;
        let written = written.join(", ");
        log.info("init-repo", "Wrote default files", &[("files", written.as_str())]);
    }

    if request.no_remote {
        log.info("init-repo", "Skipping remote creation", &[]);
        return Ok(());
    }

    create_remote(remote, log, token, request.root, request.repo_name, request.org, request.private)
        .await
        .map_err(|e| failure(log, FailureSite::RemoteCreate, "Failed to create remote repository", e))?;

    let owner = resolve_owner(owners)
        .map_err(|e| failure(log, FailureSite::RemoteAttach, "Cannot determine GitHub owner for remote URL", e))?;
    let url = remote_url(&owner, request.repo_name);
    vcs.add_remote(request.root, &url)
        .map_err(|e| failure(log, FailureSite::RemoteAttach, "Failed to add remote", e))?;

    log.info("init-repo", "Repository initialized and remote configured", &[("url", url.as_str())]);
    Ok(())
}

fn describe(request: &InitRequest<'_>, log: &EventLog, output: &Output) {
    log.info(
        "init-repo",
        "[dry-run] Would initialize git repo and create standard files (.gitignore, .rogueignore, LICENSE, README)",
        &[],
    );
    output.step(&format!("Would initialize a git repository in {}", request.root.display()));

    if request.no_remote {
        return;
    }

    // No gh call in a dry run
    let sources: Vec<Box<dyn OwnerSource>> = vec![
        Box::new(ExplicitOrg(request.org.map(str::to_string))),
        Box::new(EnvVar("GITHUB_USER")),
    ];
    let owner = resolve_owner(&sources).unwrap_or_else(|_| "<owner>".to_string());
    let url = remote_url(&owner, request.repo_name);
    let private = request.private.to_string();
    log.info(
        "init-repo",
        "[dry-run] Would create and set GitHub remote",
        &[("url", url.as_str()), ("private", private.as_str())],
    );
    output.step(&format!(
        "Would create {} repository and set origin to {}",
        if request.private { "a private" } else { "a public" },
        url
    ));
}

fn failure(log: &EventLog, site: FailureSite, message: &str, source: impl Into<anyhow::Error>) -> anyhow::Error {
    let source = source.into();
    log.error("init-repo", message, &[("error", format!("{source:#}").as_str())]);
    CommandFailure::new(site, source.context(message.to_string())).into()
}
