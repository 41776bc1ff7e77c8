//! `.rogueignore` rules
//!
//! Patterns understand two wildcards: `?` matches any single character and
//! `*` matches any run of characters, including `/`. Everything else is
//! literal. A rule ignores a file when it matches either the root-relative path
//! or the bare file name, so `*.pem` catches `secrets/deep/a.pem` without
//! needing `**`.

use regex::{Regex, RegexSet};
use std::path::Path;

use crate::error::RogueError;

/// Ignore file looked up at the scan root
pub const IGNORE_FILE_NAME: &str = ".rogueignore";

/// Translate a wildcard pattern into an anchored regular expression
pub fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("(?s)^");

    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}

/// Whole-string wildcard match of a single pattern
pub fn matches(pattern: &str, text: &str) -> bool {
    Regex::new(&glob_to_regex(pattern))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Uncompiled form of [`IgnoreRuleSet::is_ignored`]
pub fn is_ignored(relative_path: &str, patterns: &[String]) -> bool {
    let name = file_name(relative_path);
    patterns
        .iter()
        .any(|pattern| matches(pattern, relative_path) || matches(pattern, name))
}

/// Final `/`-separated segment of a relative path
pub fn file_name(relative_path: &str) -> &str {
    relative_path
        .rsplit_once('/')
        .map_or(relative_path, |(_, name)| name)
}

/// Ordered ignore patterns compiled into a single [`RegexSet`]
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
    set: RegexSet,
}

impl IgnoreRuleSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, RogueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = RegexSet::new(patterns.iter().map(|p| glob_to_regex(p)))
            .map_err(|e| RogueError::Config(format!("invalid ignore pattern: {e}")))?;
        Ok(Self { patterns, set })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// Parse ignore file content: one pattern per line, `#` starts a comment line
    pub fn parse(content: &str) -> Result<Self, RogueError> {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load `<root>/.rogueignore`; a missing file yields an empty set
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self, RogueError> {
        let path = root.as_ref().join(IGNORE_FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::empty()),
            Err(e) => Err(RogueError::io(path, e)),
        }
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path) || self.set.is_match(file_name(relative_path))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
