use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::cli::Output;
use crate::config::{Overrides, Settings};
use crate::logging::EventLog;

pub mod full_run;
pub mod init_repo;
pub mod push_all;
pub mod scan;

#[derive(Parser)]
#[command(
    name = "roguebox",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inventory a workspace and push it to GitHub in size-bounded commits",
    long_about = "roguebox scans a directory, leaves out ignored, secret-looking and oversized files, \
                  initializes a git repository with a GitHub remote, and pushes the content, \
                  splitting large imports into ~50MB commits."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// key=value configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inventory a directory and print the result as JSON
    Scan(scan::ScanArgs),
    /// Initialize a git repository and create its GitHub remote
    InitRepo(init_repo::InitRepoArgs),
    /// Stage, commit and push the workspace, chunking large imports
    PushAll(push_all::PushAllArgs),
    /// Scan, init-repo and push-all in sequence, then record a proof of work
    FullRun(full_run::FullRunArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Scan(args)) => scan::execute(args, config, &output).await,
            Some(Commands::InitRepo(args)) => init_repo::execute(args, config, &output).await,
            Some(Commands::PushAll(args)) => push_all::execute(args, config, &output).await,
            Some(Commands::FullRun(args)) => full_run::execute(args, config, &output).await,
            None => {
                Cli::command().print_help()?;
                anyhow::bail!("no command given")
            }
        }
    }
}

/// Settings and event log shared by one command invocation
pub struct Session {
    pub settings: Settings,
    pub log: EventLog,
}

impl Session {
    pub fn open(config: Option<&Path>, overrides: &Overrides, output: &Output) -> Result<Self> {
        let settings = Settings::load(config, overrides)?;
        let log = match EventLog::open(&settings.log_file) {
            Ok(log) => log,
            Err(e) => {
                output.warning(&format!("Event log disabled: {e:#}"));
                EventLog::console_only()
            }
        };
        if let Some(path) = config {
            log.info("config", &format!("Loaded {}", path.display()), &[]);
        }
        Ok(Self { settings, log })
    }
}

/// Map `--private` / `--public` to an override
pub(crate) fn visibility_override(private: bool, public: bool) -> Option<bool> {
    match (private, public) {
        (_, true) => Some(false),
        (true, false) => Some(true),
        (false, false) => None,
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,reqwest=warn,hyper=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,reqwest=warn,hyper=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
