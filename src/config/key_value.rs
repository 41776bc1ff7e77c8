//! `key=value` configuration file provider for Figment.
//!
//! One setting per line, key and value trimmed. Lines without `=`, unknown
//! keys and values that do not parse are skipped. A missing file contributes
//! nothing.

use figment::value::{Dict, Map, Value};
use figment::{Error, Metadata, Profile, Provider, Source};
use std::path::{Path, PathBuf};

const STRING_KEYS: &[&str] = &["root", "repo_name", "branch", "log_file", "proof_file"];
const NUMBER_KEYS: &[&str] = &["max_size_mb", "chunk_ceiling_mb", "chunk_trigger_mb"];

/// Provider reading a flat `key=value` file
pub struct KeyValueFile {
    path: PathBuf,
}

impl KeyValueFile {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Provider for KeyValueFile {
    fn metadata(&self) -> Metadata {
        Metadata::from("key=value file", Source::File(self.path.clone()))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(Error::from(format!(
                    "failed to read config file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let mut map = Map::new();
        map.insert(Profile::Default, parse(&content));
        Ok(map)
    }
}

/// Parse the known keys of a `key=value` document
pub fn parse(content: &str) -> Dict {
    let mut dict = Dict::new();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == "private" {
            dict.insert(key.to_string(), Value::from(value == "true" || value == "1"));
        } else if STRING_KEYS.contains(&key) {
            dict.insert(key.to_string(), Value::from(value.to_string()));
        } else if NUMBER_KEYS.contains(&key) {
            match value.parse::<u64>() {
                Ok(number) => {
                    dict.insert(key.to_string(), Value::from(number));
                }
                Err(_) => tracing::debug!("ignoring non-numeric config value {}={}", key, value),
            }
        }
    }

    dict
}
