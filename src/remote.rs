//! GitHub remote creation and owner resolution
//!
//! A repository is created through the REST API when a token is available
//! and through the `gh` CLI otherwise. The owner used in the remote URL is
//! resolved from an ordered list of [`OwnerSource`] strategies.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::RogueError;
use crate::logging::EventLog;
use crate::utils::command_exists;

pub const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "RogueMagicBox";

/// Creates the hosted repository that `origin` will point at
#[allow(async_fn_in_trait)]
pub trait RemoteCreator {
    async fn create_via_api(&self, name: &str, org: Option<&str>, private: bool, token: &str) -> Result<()>;

    fn create_via_cli(&self, workdir: &Path, name: &str, org: Option<&str>, private: bool) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    private: bool,
}

/// GitHub over reqwest and the `gh` CLI
pub struct GitHub<'a> {
    client: reqwest::Client,
    api_base: String,
    log: &'a EventLog,
}

impl<'a> GitHub<'a> {
    pub fn new(log: &'a EventLog) -> Self {
        Self::with_api_base(GITHUB_API, log)
    }

    pub fn with_api_base(api_base: impl Into<String>, log: &'a EventLog) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            log,
        }
    }

    fn gh(&self, workdir: &Path, args: &[&str]) -> Result<bool> {
        self.log.info("github", &format!("exec: gh {}", args.join(" ")), &[]);
        let status = Command::new("gh")
            .args(args)
            .current_dir(workdir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to execute gh {}", args.join(" ")))?;
        Ok(status.success())
    }
}

impl RemoteCreator for GitHub<'_> {
    async fn create_via_api(&self, name: &str, org: Option<&str>, private: bool, token: &str) -> Result<()> {
        let url = repos_endpoint(&self.api_base, org);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&CreateRepoRequest { name, private })
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status().as_u16();
        if status >= 300 {
            let body = response.text().await.unwrap_or_default();
            self.log
                .error("github", "API create repo failed", &[("http", status.to_string().as_str())]);
            return Err(RogueError::Http { status, body }.into());
        }

        self.log.info("github", "Repo created via API", &[("name", name)]);
        Ok(())
    }

    fn create_via_cli(&self, workdir: &Path, name: &str, org: Option<&str>, private: bool) -> Result<()> {
        if !command_exists("gh") {
            return Err(RogueError::RemoteAuth.into());
        }

        let full_name = qualified_name(name, org);
        if self.gh(workdir, &["repo", "view", &full_name])? {
            self.log
                .info("github", "Repo already exists on GitHub; skipping creation", &[("repo", full_name.as_str())]);
            return Ok(());
        }

        let visibility = if private { "--private" } else { "--public" };
        let args = ["repo", "create", full_name.as_str(), visibility];
        if !self.gh(workdir, &args)? {
            self.log.error("github", "gh repo create failed", &[("repo", full_name.as_str())]);
            return Err(RogueError::Process {
                command: format!("gh {}", args.join(" ")),
                code: None,
            }
            .into());
        }

        self.log.info("github", "Repo created via gh CLI", &[("repo", full_name.as_str())]);
        Ok(())
    }
}

/// Create the remote repository, preferring the API when a token is present
pub async fn create_remote<C: RemoteCreator>(
    creator: &C,
    log: &EventLog,
    token: Option<&str>,
    workdir: &Path,
    name: &str,
    org: Option<&str>,
    private: bool,
) -> Result<()> {
    match token {
        Some(token) => creator.create_via_api(name, org, private, token).await,
        None => {
            log.warn("init-repo", "No GitHub token found. Falling back to gh CLI if available.", &[]);
            creator.create_via_cli(workdir, name, org, private)
        }
    }
}

/// `GITHUB_TOKEN`, when set and non-empty
pub fn read_github_token() -> Option<String> {
    non_empty_env("GITHUB_TOKEN")
}

pub fn repos_endpoint(api_base: &str, org: Option<&str>) -> String {
    let base = api_base.trim_end_matches('/');
    match org.filter(|o| !o.is_empty()) {
        Some(org) => format!("{base}/orgs/{org}/repos"),
        None => format!("{base}/user/repos"),
    }
}

fn qualified_name(name: &str, org: Option<&str>) -> String {
    match org.filter(|o| !o.is_empty()) {
        Some(org) => format!("{org}/{name}"),
        None => name.to_string(),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// One way of finding the account that owns the remote
pub trait OwnerSource {
    fn name(&self) -> &'static str;
    fn resolve(&self) -> Option<String>;
}

/// `--org` from the command line
pub struct ExplicitOrg(pub Option<String>);

impl OwnerSource for ExplicitOrg {
    fn name(&self) -> &'static str {
        "org"
    }

    fn resolve(&self) -> Option<String> {
        self.0.clone().filter(|o| !o.trim().is_empty())
    }
}

/// Owner taken from an environment variable
pub struct EnvVar(pub &'static str);

impl OwnerSource for EnvVar {
    fn name(&self) -> &'static str {
        self.0
    }

    fn resolve(&self) -> Option<String> {
        non_empty_env(self.0)
    }
}

/// Login of the account `gh` is authenticated as
pub struct GhCli;

impl OwnerSource for GhCli {
    fn name(&self) -> &'static str {
        "gh"
    }

    fn resolve(&self) -> Option<String> {
        if !command_exists("gh") {
            return None;
        }
        let output = Command::new("gh")
            .args(["api", "user", "--jq", ".login"])
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let login = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!login.is_empty()).then_some(login)
    }
}

/// Explicit org, then `GITHUB_USER`, then the `gh` login
pub fn default_owner_sources(org: Option<&str>) -> Vec<Box<dyn OwnerSource>> {
    vec![
        Box::new(ExplicitOrg(org.map(str::to_string))),
        Box::new(EnvVar("GITHUB_USER")),
        Box::new(GhCli),
    ]
}

/// First non-empty owner wins
pub fn resolve_owner(sources: &[Box<dyn OwnerSource>]) -> Result<String, RogueError> {
    for source in sources {
        if let Some(owner) = source.resolve() {
            tracing::debug!("GitHub owner '{}' resolved from {}", owner, source.name());
            return Ok(owner);
        }
    }
    Err(RogueError::OwnerUnresolved)
}
