//! User configuration for the pedigree tool.
//!
//! The configuration lives in a single TOML file:
//!
//! - **Unix/macOS**: `~/.pigeon-pedigree/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\pigeon-pedigree\config.toml`
//!
//! The location can be overridden with `--config <path>` or the `PEDIGREE_CONFIG`
//! environment variable. A missing file means "use defaults".
//!
//! # Example
//!
//! ```toml
//! [lookup]
//! base_url = "https://loft.example.com/api/v1"
//! token = "YOUR_TOKEN"
//! timeout_secs = 10
//! retries = 2
//!
//! [pedigree]
//! generations = 4
//! annotation_levels = 1
//! ```
//!
//! # Security
//!
//! The lookup token is a credential. Files written by [`PedigreeConfig::save_to`] get
//! `0600` permissions on Unix, and [`PedigreeConfig::redacted`] should be used before
//! printing a configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::parser::parse_config_str;
use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_ANNOTATION_LEVELS, DEFAULT_GENERATIONS, DEFAULT_LOOKUP_RETRIES,
    DEFAULT_LOOKUP_TIMEOUT_SECS,
};
use crate::core::PedigreeError;

const CONFIG_DIR_NAME: &str = "pigeon-pedigree";
const CONFIG_FILE_NAME: &str = "config.toml";
const REDACTED: &str = "***";

/// Complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeConfig {
    /// Connection settings for the lookup service.
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Defaults for pedigree requests.
    #[serde(default)]
    pub pedigree: PedigreeSettings,
}

/// `[lookup]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Root URL of the loft backend. Required unless a registry file is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    pub retries: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            retries: DEFAULT_LOOKUP_RETRIES,
        }
    }
}

/// `[pedigree]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedigreeSettings {
    /// Generations used when `--generations` is not given.
    pub generations: u32,

    /// Levels annotated with competition history for open-ended requests.
    pub annotation_levels: u32,
}

impl Default for PedigreeSettings {
    fn default() -> Self {
        Self {
            generations: DEFAULT_GENERATIONS,
            annotation_levels: DEFAULT_ANNOTATION_LEVELS,
        }
    }
}

impl PedigreeConfig {
    /// Load from the resolved default location, or defaults if no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from [`resolve_path`](Self::resolve_path).
    ///
    /// An explicitly given path that does not exist is an error; a missing default
    /// file is not.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PedigreeError::ConfigNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Self::load_from(&path).await
            }
            None => {
                let path = Self::resolve_path(None)?;
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    tracing::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = parse_config_str(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set secure permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// Platform default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join(CONFIG_DIR_NAME)
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(format!(".{CONFIG_DIR_NAME}"))
        };

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Config file location: `explicit`, then `PEDIGREE_CONFIG`, then
    /// [`default_path`](Self::default_path).
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        Self::resolve_path_with(explicit, std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
    }

    fn resolve_path_with(explicit: Option<PathBuf>, from_env: Option<PathBuf>) -> Result<PathBuf> {
        match explicit.or(from_env.filter(|p| !p.as_os_str().is_empty())) {
            Some(path) => Ok(path),
            None => Self::default_path(),
        }
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<(), PedigreeError> {
        if self.lookup.timeout_secs == 0 {
            return Err(PedigreeError::ConfigError {
                message: "lookup.timeout_secs must be greater than zero".to_string(),
            });
        }

        if let Some(url) = &self.lookup.base_url
            && url.trim().is_empty()
        {
            return Err(PedigreeError::ConfigError {
                message: "lookup.base_url must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Copy with the token masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.lookup.token.is_some() {
            copy.lookup.token = Some(REDACTED.to_string());
        }
        copy
    }

    /// Starter configuration written by `pedigree config init`.
    #[must_use]
    pub fn init_example() -> Self {
        Self {
            lookup: LookupConfig {
                base_url: Some("https://loft.example.com/api/v1".to_string()),
                token: Some("YOUR_TOKEN".to_string()),
                ..LookupConfig::default()
            },
            pedigree: PedigreeSettings::default(),
        }
    }
}
