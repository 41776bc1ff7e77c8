//! # roguebox
//!
//! Inventory a workspace, leave out ignored, secret-looking and oversized
//! files, and publish the rest to GitHub in size-bounded commits.
//!
//! ```bash
//! roguebox scan --root ./workshop > inventory.json
//! roguebox full-run --root ./workshop --repo-name workshop --org acme
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod plan;
pub mod proof;
pub mod remote;
pub mod scanner;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::Settings;
pub use error::{CommandFailure, FailureSite, RogueError};

/// Result type alias for roguebox operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
