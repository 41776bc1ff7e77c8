//! Scan inventory and its JSON form
//!
//! The serialized document is `{root, generated_at, files, total_size}` with
//! files in traversal order. Sizes are plain `u64` integers so they survive a
//! round trip exactly, well past 2^53 bytes.

use serde::{Deserialize, Serialize};

use crate::error::RogueError;

/// One file accepted by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative path with `/` separators
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Hex content fingerprint
    pub hash: String,
    /// Modification time, local ISO-8601
    pub mtime: String,
}

/// Snapshot of one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    root: String,
    generated_at: String,
    files: Vec<FileRecord>,
    total_size: u64,
}

impl Inventory {
    pub fn new(root: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            generated_at: generated_at.into(),
            files: Vec::new(),
            total_size: 0,
        }
    }

    /// Append a record, keeping `total_size` in step
    pub fn push(&mut self, record: FileRecord) {
        self.total_size += record.size;
        self.files.push(record);
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Parse a serialized inventory, rejecting documents whose total is off
    pub fn from_json(json: &str) -> Result<Self, RogueError> {
        let inventory: Inventory = serde_json::from_str(json)
            .map_err(|e| RogueError::Config(format!("malformed inventory: {e}")))?;

        let sum = inventory
            .files
            .iter()
            .try_fold(0u64, |acc, f| acc.checked_add(f.size))
            .ok_or_else(|| RogueError::Config("inventory file sizes overflow u64".to_string()))?;
        if sum != inventory.total_size {
            return Err(RogueError::Config(format!(
                "inventory total_size {} does not match sum of file sizes {}",
                inventory.total_size, sum
            )));
        }
        Ok(inventory)
    }
}
