//! Default files written into a freshly initialized repository

use anyhow::Result;
use std::path::Path;

use crate::scanner::IGNORE_FILE_NAME;
use crate::utils::ensure_file_with_content;

const GITIGNORE: &str = include_str!("../../templates/gitignore");
const ROGUEIGNORE: &str = include_str!("../../templates/rogueignore");
const LICENSE: &str = include_str!("../../templates/LICENSE");
const README: &str = include_str!("../../templates/README.md");

/// Names of the files created by [`write_defaults`], in creation order
pub const DEFAULT_FILES: [&str; 4] = [".gitignore", IGNORE_FILE_NAME, "LICENSE", "README.md"];

/// Create each default file that does not exist yet; returns the ones written
pub fn write_defaults(root: &Path) -> Result<Vec<&'static str>> {
    let license = LICENSE.replace("{year}", &chrono::Local::now().format("%Y").to_string());
    let contents = [GITIGNORE, ROGUEIGNORE, license.as_str(), README];

    let mut created = Vec::new();
    for (name, content) in DEFAULT_FILES.into_iter().zip(contents) {
        if ensure_file_with_content(root.join(name), content)? {
            created.push(name);
        }
    }
    Ok(created)
}
