//! Command-line interface for roguebox
//!
//! Argument parsing uses clap derive; each subcommand lives in its own
//! module under `commands`.

pub mod commands;
mod output;

pub use commands::{Cli, Commands};
pub use output::Output;
