use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use super::key_value::KeyValueFile;
use crate::error::RogueError;
use crate::plan::PushPolicy;
use crate::scanner::DEFAULT_MAX_SIZE_MB;

pub const ENV_PREFIX: &str = "ROGUEBOX_";
pub const DEFAULT_BRANCH: &str = "main";

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub repo_name: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub private: bool,
    pub max_size_mb: u64,
    pub branch: String,
    pub log_file: PathBuf,
    pub proof_file: PathBuf,
    pub chunk_ceiling_mb: u64,
    pub chunk_trigger_mb: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: None,
            repo_name: None,
            private: true,
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            branch: DEFAULT_BRANCH.to_string(),
            log_file: PathBuf::from("logs/roguebox.log"),
            proof_file: PathBuf::from("docs/PROOF_OF_WORK.md"),
            chunk_ceiling_mb: 50,
            chunk_trigger_mb: 100,
        }
    }
}

/// Values given on the command line; `None` leaves lower layers alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Settings {
    /// Merge defaults, the optional config file, `ROGUEBOX_*` and CLI overrides
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Ok(Self::figment(config_file, overrides)
            .extract::<Settings>()
            .map_err(|e| RogueError::Config(e.to_string()))?
            .validated()?)
    }

    pub fn figment(config_file: Option<&Path>, overrides: &Overrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(path) = config_file {
            figment = figment.merge(KeyValueFile::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    fn validated(self) -> Result<Self, RogueError> {
        if self.chunk_ceiling_mb == 0 {
            return Err(RogueError::Config("chunk_ceiling_mb must be at least 1".into()));
        }
        if self.branch.trim().is_empty() {
            return Err(RogueError::Config("branch must not be empty".into()));
        }
        Ok(self)
    }

    /// Scan root, required by every command
    pub fn require_root(&self) -> Result<&Path, RogueError> {
        self.root
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| RogueError::Config("no root given (use --root or set root= in the config file)".into()))
    }

    pub fn require_repo_name(&self) -> Result<&str, RogueError> {
        self.repo_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                RogueError::Config("no repository name given (use --repo-name or set repo_name= in the config file)".into())
            })
    }

    pub fn push_policy(&self) -> PushPolicy {
        PushPolicy::from_mib(self.chunk_ceiling_mb, self.chunk_trigger_mb)
    }
}

/// Accept `true`/`false`, `1`/`0` and their string forms
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(i) => i == 1,
        Raw::Text(s) => s == "true" || s == "1",
    })
}
