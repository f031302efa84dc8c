//! Terminal progress feedback.
//!
//! Progress output is suppressed when `--no-progress` is passed or the
//! `PEDIGREE_NO_PROGRESS` environment variable is set to any value. A suppressed
//! spinner is a hidden `indicatif` bar, so callers never branch on it.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::constants::NO_PROGRESS_ENV;

/// Whether progress output is disabled through the environment.
#[must_use]
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Spinner shown while a pedigree is being resolved.
#[derive(Debug, Clone)]
pub struct Spinner {
    inner: ProgressBar,
}

impl Spinner {
    /// Start a spinner, or a hidden one if `hidden` is set or progress is disabled.
    #[must_use]
    pub fn start(message: impl Into<String>, hidden: bool) -> Self {
        let inner = if hidden || is_progress_disabled() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        inner.set_message(message.into());
        Self {
            inner,
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.set_message(message.into());
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
