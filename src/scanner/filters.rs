//! Filters applied to every file found during a scan
//!
//! Each filter answers with a [`FilterDecision`]. The scanner runs them in a
//! fixed order (ignore rules, sensitivity, size); any of them can exclude a
//! file and they do not depend on each other.

use super::ignore::{IgnoreRuleSet, file_name};
use super::sensitive::is_sensitive;
use crate::utils::MIB;

/// Common trait for scan filters
pub trait Filter {
    /// What the filter looks at
    type Input: ?Sized;

    fn filter(&self, input: &Self::Input) -> FilterDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Ignored,
    Sensitive,
    TooLarge,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::Ignored => "ignored",
            SkipReason::Sensitive => "sensitive skipped",
            SkipReason::TooLarge => "too large, skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Process,
    Skip(SkipReason),
}

/// Applies `.rogueignore` rules to root-relative paths
pub struct IgnoreFilter<'a> {
    rules: &'a IgnoreRuleSet,
}

impl<'a> IgnoreFilter<'a> {
    pub fn new(rules: &'a IgnoreRuleSet) -> Self {
        Self { rules }
    }
}

impl Filter for IgnoreFilter<'_> {
    type Input = str;

    fn filter(&self, relative_path: &str) -> FilterDecision {
        if self.rules.is_ignored(relative_path) {
            FilterDecision::Skip(SkipReason::Ignored)
        } else {
            FilterDecision::Process
        }
    }
}

/// Drops likely secret files unless secrets were explicitly requested
pub struct SensitiveFilter {
    include_secrets: bool,
}

impl SensitiveFilter {
    pub fn new(include_secrets: bool) -> Self {
        Self { include_secrets }
    }
}

impl Filter for SensitiveFilter {
    type Input = str;

    fn filter(&self, relative_path: &str) -> FilterDecision {
        if !self.include_secrets && is_sensitive(file_name(relative_path)) {
            FilterDecision::Skip(SkipReason::Sensitive)
        } else {
            FilterDecision::Process
        }
    }
}

/// Per-file size ceiling, compared in whole MiB
pub struct SizeFilter {
    max_size_mb: u64,
}

impl SizeFilter {
    pub fn new(max_size_mb: u64) -> Self {
        Self { max_size_mb }
    }
}

impl Filter for SizeFilter {
    type Input = u64;

    fn filter(&self, size: &u64) -> FilterDecision {
        // Floor division: a 50.9 MiB file passes a 50 MiB ceiling
        if size / MIB > self.max_size_mb {
            FilterDecision::Skip(SkipReason::TooLarge)
        } else {
            FilterDecision::Process
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_filter() {
        let rules = IgnoreRuleSet::new(["*.pem"]).unwrap();
        let filter = IgnoreFilter::new(&rules);
        assert_eq!(filter.filter("secrets/a.pem"), FilterDecision::Skip(SkipReason::Ignored));
        assert_eq!(filter.filter("src/lib.rs"), FilterDecision::Process);
    }

    #[test]
    fn test_sensitive_filter_respects_include_secrets() {
        let strict = SensitiveFilter::new(false);
        let lenient = SensitiveFilter::new(true);
        assert_eq!(strict.filter("config/.env"), FilterDecision::Skip(SkipReason::Sensitive));
        assert_eq!(lenient.filter("config/.env"), FilterDecision::Process);
    }

    #[test]
    fn test_sensitive_filter_looks_at_file_name_only() {
        let filter = SensitiveFilter::new(false);
        assert_eq!(filter.filter("tokens/readme.md"), FilterDecision::Process);
        assert_eq!(filter.filter("x/api_token"), FilterDecision::Skip(SkipReason::Sensitive));
    }

    #[test]
    fn test_size_filter_uses_whole_mib() {
        let filter = SizeFilter::new(1);
        assert_eq!(filter.filter(&0), FilterDecision::Process);
        assert_eq!(filter.filter(&MIB), FilterDecision::Process);
        assert_eq!(filter.filter(&(2 * MIB - 1)), FilterDecision::Process);
        assert_eq!(filter.filter(&(2 * MIB)), FilterDecision::Skip(SkipReason::TooLarge));
    }

    #[test]
    fn test_zero_ceiling_keeps_sub_mib_files() {
        let filter = SizeFilter::new(0);
        assert_eq!(filter.filter(&(MIB - 1)), FilterDecision::Process);
        assert_eq!(filter.filter(&MIB), FilterDecision::Skip(SkipReason::TooLarge));
    }
}
