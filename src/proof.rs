//! Proof-of-work document
//!
//! Every full run appends a section recording when it ran and the exact
//! inventory it pushed. Earlier sections are never rewritten.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::scanner::Inventory;

/// Render one proof-of-work section
pub fn render_section(generated_at: &str, inventory: &Inventory) -> String {
    format!(
        "# PROOF OF WORK\n\nGenerated at: {}\n\n## Inventory\n\n````json\n{}\n````\n",
        generated_at,
        inventory.to_json_pretty()
    )
}

/// Append a section to `path`, creating the file and its directory if needed
pub fn append_proof_of_work(path: &Path, generated_at: &str, inventory: &Inventory) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    file.write_all(render_section(generated_at, inventory).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
