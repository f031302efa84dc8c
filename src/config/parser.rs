//! TOML parsing helpers with file path context.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a TOML file into `T`.
///
/// ```rust,no_run
/// use pigeon_pedigree::config::{PedigreeConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: PedigreeConfig = parse_config(Path::new("config.toml"))?;
/// println!("{:?}", config.lookup.base_url);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content, path)
}

/// Parse TOML text that was read from `origin`.
pub fn parse_config_str<T>(content: &str, origin: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    toml::from_str(content)
        .with_context(|| format!("Failed to parse config file: {}", origin.display()))
}
