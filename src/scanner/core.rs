use std::fs::{File, Metadata};
use std::io;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use super::filters::{Filter, FilterDecision, IgnoreFilter, SensitiveFilter, SizeFilter, SkipReason};
use super::ignore::IgnoreRuleSet;
use super::inventory::{FileRecord, Inventory};
use super::types::{ScanOptions, ScanResult, ScanStats};
use crate::error::RogueError;
use crate::logging::EventLog;
use crate::utils::{iso_timestamp, system_time_iso};

/// VCS metadata directory, never part of an inventory
const VCS_DIR: &str = ".git";

const CTX: &str = "scan";

/// Walks a workspace and builds its [`Inventory`]
pub struct Scanner {
    options: ScanOptions,
    rules: IgnoreRuleSet,
}

impl Scanner {
    /// Check the root and load its ignore rules
    pub fn new(options: ScanOptions) -> Result<Self, RogueError> {
        check_root(&options.root)?;
        let rules = IgnoreRuleSet::load(&options.root)?;
        Ok(Self { options, rules })
    }

    /// Walk the tree in file-name order and apply the filters to every regular file
    pub fn scan(&self, log: &EventLog) -> Result<ScanResult, RogueError> {
        let start_time = Instant::now();
        let root = &self.options.root;
        let mut inventory = Inventory::new(root.display().to_string(), iso_timestamp());
        let mut tally = Tally::default();

        if !self.options.includes.is_empty() || !self.options.excludes.is_empty() {
            let includes = self.options.includes.join(",");
            let excludes = self.options.excludes.join(",");
            log.info(
                CTX,
                "include/exclude globs are accepted but not applied; use .rogueignore",
                &[("includes", includes.as_str()), ("excludes", excludes.as_str())],
            );
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.depth() > 0 && e.file_type().is_dir() && e.file_name() == VCS_DIR));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e.into_io_error().unwrap_or_else(|| io::Error::other("walk failed"));
                    return Err(RogueError::io(root.clone(), source));
                }
                Err(e) => {
                    tally.unreadable(log, format!("unreadable entry skipped: {e}"));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            tally.stats.files_seen += 1;

            let Some(rel) = relative_path(root, entry.path()) else {
                let lossy = entry.path().strip_prefix(root).unwrap_or(entry.path()).display().to_string();
                tally.unreadable(log, format!("path is not valid UTF-8, skipped: {lossy}"));
                continue;
            };

            let metadata = entry.metadata().map_err(io::Error::from);
            if let Some(record) = self.examine(rel, entry.path(), metadata, fingerprint_file, &mut tally, log) {
                inventory.push(record);
            }
        }

        let Tally { mut stats, warnings } = tally;
        stats.scan_duration_ms = start_time.elapsed().as_millis() as u64;

        Ok(ScanResult {
            inventory,
            stats,
            warnings,
        })
    }

    /// Filter, stat and fingerprint one file; `None` when it is skipped
    fn examine<F>(
        &self,
        rel: String,
        path: &Path,
        metadata: io::Result<Metadata>,
        fingerprint: F,
        tally: &mut Tally,
        log: &EventLog,
    ) -> Option<FileRecord>
    where
        F: FnOnce(&Path) -> io::Result<String>,
    {
        if let FilterDecision::Skip(reason) = IgnoreFilter::new(&self.rules).filter(&rel) {
            log.debug(CTX, &format!("{} {}", reason.describe(), rel), &[]);
            tally.stats.skipped_ignored += 1;
            return None;
        }
        if let FilterDecision::Skip(reason) = SensitiveFilter::new(self.options.include_secrets).filter(&rel) {
            log.warn(CTX, &format!("{}: {}", reason.describe(), rel), &[]);
            tally.stats.skipped_sensitive += 1;
            return None;
        }

        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) => {
                tally.unreadable(log, format!("cannot stat {rel}: {e}"));
                return None;
            }
        };
        let size = metadata.len();

        if let FilterDecision::Skip(reason) = SizeFilter::new(self.options.max_size_mb).filter(&size) {
            log.warn(CTX, &format!("{}: {}", reason.describe(), rel), &[]);
            tally.stats.skipped_too_large += 1;
            return None;
        }

        let hash = match fingerprint(path) {
            Ok(hash) => hash,
            Err(e) => {
                tally.unreadable(log, format!("cannot read {rel}: {e}"));
                return None;
            }
        };
        let mtime = metadata.modified().map(system_time_iso).unwrap_or_default();

        tally.stats.files_included += 1;
        Some(FileRecord {
            path: rel,
            size,
            hash,
            mtime,
        })
    }
}

/// Running counts and per-file warnings for one scan
#[derive(Default)]
struct Tally {
    stats: ScanStats,
    warnings: Vec<String>,
}

impl Tally {
    fn unreadable(&mut self, log: &EventLog, message: String) {
        log.warn(CTX, &message, &[]);
        self.warnings.push(message);
        self.stats.skipped_unreadable += 1;
    }
}

/// Convenience wrapper: build a [`Scanner`] and run it once
pub fn scan(options: &ScanOptions, log: &EventLog) -> Result<ScanResult, RogueError> {
    Scanner::new(options.clone())?.scan(log)
}

/// Skip reason counts as `(reason, count)` pairs, for summaries
pub fn skip_breakdown(stats: &ScanStats) -> [(SkipReason, usize); 3] {
    [
        (SkipReason::Ignored, stats.skipped_ignored),
        (SkipReason::Sensitive, stats.skipped_sensitive),
        (SkipReason::TooLarge, stats.skipped_too_large),
    ]
}

fn check_root(root: &Path) -> Result<(), RogueError> {
    let metadata = std::fs::metadata(root).map_err(|e| RogueError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(RogueError::io(
            root,
            io::Error::new(io::ErrorKind::NotADirectory, "scan root is not a directory"),
        ));
    }
    std::fs::read_dir(root).map_err(|e| RogueError::io(root, e))?;
    Ok(())
}

/// Root-relative path joined with `/` whatever the host separator
///
/// `None` when a component is not valid UTF-8: such a name cannot be
/// recorded without altering it.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// blake3 digest of the file content, hex encoded
///
/// This is a content fingerprint used to identify files in the inventory.
pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}
