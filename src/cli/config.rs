//! Manage the configuration file.
//!
//! ```bash
//! pedigree config path           # where the config is read from
//! pedigree config show           # effective config, token masked
//! pedigree config init [--force] # write a starter config
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::PedigreeConfig;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = PedigreeConfig::resolve_path(config_path)?;

        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = PedigreeConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Set lookup.base_url to your loft backend");
        println!("  2. Replace 'YOUR_TOKEN' with your access token");

        Ok(())
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let location = PedigreeConfig::resolve_path(config_path.clone())?;
        let exists = location.exists();
        let config = PedigreeConfig::load_with_optional(config_path).await?;

        println!("{}", "Pedigree Configuration".bold());
        println!("Location: {}\n", location.display());

        if !exists {
            println!("No config file found, showing defaults.");
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'pedigree config init' to create an example configuration\n");
        }
        println!("{}", toml::to_string_pretty(&config.redacted())?);

        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        let path = PedigreeConfig::resolve_path(config_path)?;
        println!("{}", path.display());
        Ok(())
    }
}
