use std::path::PathBuf;

use super::inventory::Inventory;

/// Default per-file ceiling in MiB
pub const DEFAULT_MAX_SIZE_MB: u64 = 50;

/// Configuration for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Accepted for forward compatibility, not applied
    pub includes: Vec<String>,
    /// Accepted for forward compatibility, not applied
    pub excludes: Vec<String>,
    pub max_size_mb: u64,
    pub include_secrets: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            include_secrets: false,
        }
    }

    pub fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    pub fn with_include_secrets(mut self, include_secrets: bool) -> Self {
        self.include_secrets = include_secrets;
        self
    }

    pub fn with_globs(mut self, includes: Vec<String>, excludes: Vec<String>) -> Self {
        self.includes = includes;
        self.excludes = excludes;
        self
    }
}

/// Statistics from a scanning operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_included: usize,
    pub skipped_ignored: usize,
    pub skipped_sensitive: usize,
    pub skipped_too_large: usize,
    pub skipped_unreadable: usize,
    pub scan_duration_ms: u64,
}

impl ScanStats {
    pub fn files_skipped(&self) -> usize {
        self.skipped_ignored + self.skipped_sensitive + self.skipped_too_large + self.skipped_unreadable
    }
}

/// Result of a scanning operation
#[derive(Debug)]
pub struct ScanResult {
    pub inventory: Inventory,
    pub stats: ScanStats,
    /// Per-file problems that were skipped over
    pub warnings: Vec<String>,
}
