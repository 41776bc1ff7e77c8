use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::Session;
use crate::cli::Output;
use crate::config::Overrides;
use crate::error::{CommandFailure, FailureSite};
use crate::logging::EventLog;
use crate::scanner::{self, ScanOptions, ScanResult};
use crate::utils::format_file_size;

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Directory to inventory
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Include glob (reserved, not applied yet)
    #[arg(long = "include", value_name = "GLOB")]
    pub includes: Vec<String>,

    /// Exclude glob (reserved, not applied yet)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Skip files larger than this many MiB
    #[arg(long, value_name = "MB")]
    pub max_size_mb: Option<u64>,

    /// Accepted for symmetry with the other commands; scanning never writes
    #[arg(long)]
    pub dry_run: bool,

    /// Keep files that look like secrets (.env, *.pem, *token*, ...)
    #[arg(long)]
    pub include_secrets: bool,
}

impl ScanArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            max_size_mb: self.max_size_mb,
            ..Default::default()
        }
    }
}

pub async fn execute(args: ScanArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let session = Session::open(config, &args.overrides(), output)?;
    let root = session.settings.require_root()?;

    let options = ScanOptions::new(root)
        .with_max_size_mb(session.settings.max_size_mb)
        .with_include_secrets(args.include_secrets)
        .with_globs(args.includes, args.excludes);

    let result = scan_workspace(&options, &session.log)?;

    println!("{}", result.inventory.to_json_pretty());
    print_summary(&result, output);
    session.log.info("scan", "Completed", &[]);
    Ok(())
}

/// Run one scan, tagging a failure with the scan exit code
pub fn scan_workspace(options: &ScanOptions, log: &EventLog) -> Result<ScanResult> {
    let root = options.root.display().to_string();
    log.info("scan", "Starting scan", &[("root", root.as_str())]);

    scanner::scan(options, log).map_err(|e| {
        log.error("scan", &e.to_string(), &[]);
        CommandFailure::new(FailureSite::Scan, e).into()
    })
}

pub fn print_summary(result: &ScanResult, output: &Output) {
    let stats = &result.stats;
    output.success(&format!(
        "Scanned {} files: {} included ({}), {} skipped",
        stats.files_seen,
        stats.files_included,
        format_file_size(result.inventory.total_size()),
        stats.files_skipped()
    ));
    for (reason, count) in scanner::skip_breakdown(stats) {
        output.verbose_breakdown(reason.describe(), count);
    }
    if stats.skipped_unreadable > 0 {
        output.warning(&format!("{} entries could not be read", stats.skipped_unreadable));
    }
}
