//! Test utilities for the pedigree engine
//!
//! This module is compiled for unit tests and, through the `test-utils` feature, for
//! the integration suite. It provides:
//!
//! - [`ScriptedLookup`] - an in-memory lookup with call recording, scripted failures
//!   and gates for ordering concurrent requests
//! - [`fixtures`] - ready-made bird families (lines, diamonds, cycles, a registry file)
//! - [`init_test_logging`] - one-time tracing setup

pub mod fixtures;
mod lookup;

pub use lookup::ScriptedLookup;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` if given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=pigeon_pedigree=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
