use clap::Parser;
use std::process::ExitCode;

use roguebox::cli::{Cli, Output};
use roguebox::error::exit_code_for;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Output::new(false, false).error(&format!("{err:#}"));
            ExitCode::from(exit_code_for(&err))
        }
    }
}
