//! Command-line interface for the pedigree tool.
//!
//! # Commands
//!
//! - `tree` - resolve and display the pedigree of a bird
//! - `config` - inspect or create the configuration file
//!
//! # Global options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--config <path>` / `-c`: config file location (also `PEDIGREE_CONFIG`)
//! - `--no-progress`: no spinner (also `PEDIGREE_NO_PROGRESS`)
//!
//! Logging goes to stderr. `RUST_LOG` takes precedence over the verbosity flags.

mod config;
mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags, passed to every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,

    pub no_progress: bool,

    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Install the global tracing subscriber. Safe to call more than once.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pedigree",
    about = "Resolve and display racing pigeon pedigrees",
    version,
    author,
    long_about = "Builds the ancestry tree of a bird from the loft records, following sire and dam \
                  links up to a fixed number of generations."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the pedigree of a bird
    Tree(tree::TreeCommand),

    /// Manage the configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Tree(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(config.config_path.clone()).await,
        }
    }
}
