//! File-name heuristic for likely secrets
//!
//! Best effort only: the check looks at the file name, never at the content,
//! so a secret in `config.yml` passes and a harmless `tokenizer.rs` does not.

/// Substrings that mark a file name as sensitive (matched case-insensitively)
const SENSITIVE_FRAGMENTS: &[&str] = &[".pem", ".key", ".pfx", "token"];

/// Exact file names that are always sensitive
const SENSITIVE_NAMES: &[&str] = &[".env"];

/// True if `file_name` looks like it holds credentials
pub fn is_sensitive(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SENSITIVE_NAMES.contains(&lower.as_str())
        || SENSITIVE_FRAGMENTS.iter().any(|fragment| lower.contains(fragment))
}
