//! Core types and error handling
//!
//! - [`error`] - [`PedigreeError`], the [`ErrorContext`] wrapper and
//!   [`user_friendly_error`] for CLI display

pub mod error;

pub use error::{ErrorContext, PedigreeError, user_friendly_error};
