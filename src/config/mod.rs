//! Configuration management for roguebox
//!
//! Settings are layered with figment: built-in defaults, an optional
//! `key=value` file, `ROGUEBOX_*` environment variables, then command-line
//! flags.

pub mod core;
pub mod key_value;

pub use self::core::{DEFAULT_BRANCH, ENV_PREFIX, Overrides, Settings};
pub use key_value::KeyValueFile;
