//! Shared utilities for the CLI.

pub mod progress;

pub use progress::{Spinner, is_progress_disabled};
