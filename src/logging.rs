//! Structured event log
//!
//! Every event is mirrored to the console through `tracing` and appended to a
//! JSON-lines log file. Values are masked before they reach the file so that
//! tokens echoed in messages (for example a remote URL) are not persisted.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::utils::iso_timestamp;

/// Case-insensitive markers that trigger masking
const SECRET_MARKERS: &[&str] = &["ghp_", "github_pat_", "token", "apikey", "secret"];

/// Masking starts this many characters after the marker start
const MASK_OFFSET: usize = 4;

/// Masking stops this many characters after the marker start
const MASK_END: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Per-invocation event log; the file is closed when the log is dropped
pub struct EventLog {
    file: Option<File>,
}

impl EventLog {
    /// Open (or create) the log file in append mode, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self { file: Some(file) })
    }

    /// Console-only log, nothing is persisted
    pub fn console_only() -> Self {
        Self { file: None }
    }

    pub fn debug(&self, ctx: &str, msg: &str, fields: &[(&str, &str)]) {
        self.event(Level::Debug, ctx, msg, fields);
    }

    pub fn info(&self, ctx: &str, msg: &str, fields: &[(&str, &str)]) {
        self.event(Level::Info, ctx, msg, fields);
    }

    pub fn warn(&self, ctx: &str, msg: &str, fields: &[(&str, &str)]) {
        self.event(Level::Warn, ctx, msg, fields);
    }

    pub fn error(&self, ctx: &str, msg: &str, fields: &[(&str, &str)]) {
        self.event(Level::Error, ctx, msg, fields);
    }

    pub fn event(&self, level: Level, ctx: &str, msg: &str, fields: &[(&str, &str)]) {
        let suffix = render_fields(fields);
        match level {
            Level::Debug => tracing::debug!("{ctx}: {msg}{suffix}"),
            Level::Info => tracing::info!("{ctx}: {msg}{suffix}"),
            Level::Warn => tracing::warn!("{ctx}: {msg}{suffix}"),
            Level::Error => tracing::error!("{ctx}: {msg}{suffix}"),
        }

        if let Some(file) = &self.file {
            let line = json_line(level, ctx, msg, fields);
            // A failing log write must not abort the command
            if let Err(e) = writeln!(&*file, "{line}") {
                tracing::warn!("could not write to event log: {e}");
            }
        }
    }
}

/// Build one masked JSON object for the log file
pub fn json_line(level: Level, ctx: &str, msg: &str, fields: &[(&str, &str)]) -> String {
    let mut obj = Map::new();
    obj.insert("ts".into(), Value::String(iso_timestamp()));
    obj.insert("level".into(), Value::String(level.as_str().into()));
    obj.insert("ctx".into(), Value::String(ctx.into()));
    obj.insert("msg".into(), Value::String(mask_secrets(msg)));
    for (key, value) in fields {
        obj.insert((*key).to_string(), Value::String(mask_secrets(value)));
    }
    Value::Object(obj).to_string()
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!(" {k}={v}"))
        .collect()
}

/// Partially mask the first occurrence of each secret marker
///
/// The marker's first four characters stay readable so the log still shows
/// what kind of value was there.
pub fn mask_secrets(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for marker in SECRET_MARKERS {
        if let Some(pos) = find_ignore_case(&chars, marker) {
            let end = chars.len().min(pos + MASK_END);
            for c in chars.iter_mut().take(end).skip(pos + MASK_OFFSET) {
                *c = '*';
            }
        }
    }
    chars.into_iter().collect()
}

fn find_ignore_case(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&start| {
        haystack[start..start + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(h, n)| h.to_ascii_lowercase() == *n)
    })
}
