//! `pedigree` CLI entry point
//!
//! Parses arguments, runs the command and renders errors with suggestions.
//!
//! - `tree` - show the pedigree of a bird
//! - `config` - manage the configuration file

use anyhow::Result;
use clap::Parser;
use pigeon_pedigree::cli;
use pigeon_pedigree::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
