//! Utility functions for roguebox
//!
//! Timestamps, small filesystem helpers and tool detection shared by the
//! scanner and the command handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Bytes in one mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Current local time as `YYYY-MM-DDTHH:MM:SS`
pub fn iso_timestamp() -> String {
    Local::now().format(ISO_FORMAT).to_string()
}

/// Current local date as `YYYY-MM-DD`
pub fn iso_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Format a filesystem timestamp in local time
pub fn system_time_iso(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(ISO_FORMAT).to_string()
}

/// Check if a command exists in PATH
pub fn command_exists(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Write `content` to `path` unless the file already exists
///
/// Returns true when the file was created.
pub fn ensure_file_with_content<P: AsRef<Path>>(path: P, content: &str) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Format file size in human-readable format
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{:.0} {}", size, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
