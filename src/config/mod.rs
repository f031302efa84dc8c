//! Configuration management.
//!
//! A single user-level TOML file holds the lookup service connection (base URL, token,
//! timeout, retries) and the defaults for pedigree requests. See [`PedigreeConfig`]
//! for the file format and location rules.

mod global;
mod parser;

pub use global::{LookupConfig, PedigreeConfig, PedigreeSettings};
pub use parser::{parse_config, parse_config_str};
