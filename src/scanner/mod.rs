//! Workspace scanner
//!
//! Walks a directory tree, drops files matched by `.rogueignore`, likely
//! secrets and oversized files, and records everything else in an
//! [`Inventory`] with a content fingerprint and modification time.

pub mod core;
pub mod filters;
pub mod ignore;
pub mod inventory;
pub mod sensitive;
pub mod types;

// Re-export main types for easier access
pub use self::core::{Scanner, fingerprint_file, relative_path, scan, skip_breakdown};
pub use filters::{Filter, FilterDecision, SkipReason};
pub use ignore::{IGNORE_FILE_NAME, IgnoreRuleSet, is_ignored, matches};
pub use inventory::{FileRecord, Inventory};
pub use sensitive::is_sensitive;
pub use types::{DEFAULT_MAX_SIZE_MB, ScanOptions, ScanResult, ScanStats};
