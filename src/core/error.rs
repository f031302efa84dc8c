//! Error handling for the pedigree engine
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`PedigreeError`]) for the few failures the engine
//!    actually reports
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for the CLI
//!
//! Most things that go wrong while resolving a pedigree are *not* errors. A bare
//! identifier that matches nothing, a lookup that times out, or a parent that loops back
//! onto its own lineage all terminate a single branch quietly (see
//! [`crate::pedigree`]). Only failures at the build-request boundary, such as a subject
//! without an identifier, surface as a [`PedigreeError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use pigeon_pedigree::core::{PedigreeError, user_friendly_error};
//!
//! let error = PedigreeError::BirdNotFound { identifier: "NL-2021-1234567".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::lookup::LookupError;

/// The main error type for pedigree operations
///
/// # Error Categories
///
/// ## Build requests
/// - [`MalformedSubject`] - the subject record cannot seed a tree
/// - [`BirdNotFound`] - a subject identifier given on the command line matched nothing
///
/// ## Lookup service
/// - [`Lookup`] - a lookup failure that was not absorbed by branch tolerance
///
/// ## Configuration and input files
/// - [`ConfigError`], [`ConfigNotFound`], [`RegistryParseError`]
/// - [`IoError`], [`JsonError`], [`TomlError`] from the underlying libraries
///
/// [`MalformedSubject`]: PedigreeError::MalformedSubject
/// [`BirdNotFound`]: PedigreeError::BirdNotFound
/// [`Lookup`]: PedigreeError::Lookup
/// [`ConfigError`]: PedigreeError::ConfigError
/// [`ConfigNotFound`]: PedigreeError::ConfigNotFound
/// [`RegistryParseError`]: PedigreeError::RegistryParseError
/// [`IoError`]: PedigreeError::IoError
/// [`JsonError`]: PedigreeError::JsonError
/// [`TomlError`]: PedigreeError::TomlError
#[derive(Error, Debug)]
pub enum PedigreeError {
    /// The subject of a build request cannot be used as a tree root
    ///
    /// Raised when the subject's identifier is empty after normalization. This is the
    /// "top-level build failure" case: the coordinator turns it into an unavailable
    /// pedigree rather than passing it on.
    #[error("Malformed subject record: {reason}")]
    MalformedSubject {
        /// Why the subject was rejected
        reason: String,
    },

    /// No bird with this identifier exists in the owner's records
    #[error("Bird '{identifier}' not found in records")]
    BirdNotFound {
        /// The identifier that was searched for
        identifier: String,
    },

    /// The lookup service failed
    #[error("Lookup service error: {0}")]
    Lookup(#[from] LookupError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Config file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the configuration file that was not found
        path: String,
    },

    /// Offline registry file could not be parsed
    #[error("Invalid bird registry in {file}")]
    RegistryParseError {
        /// Path to the registry file
        file: String,
        /// Parser message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for PedigreeError {
    fn clone(&self) -> Self {
        match self {
            Self::MalformedSubject {
                reason,
            } => Self::MalformedSubject {
                reason: reason.clone(),
            },
            Self::BirdNotFound {
                identifier,
            } => Self::BirdNotFound {
                identifier: identifier.clone(),
            },
            Self::Lookup(e) => Self::Lookup(e.clone()),
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ConfigNotFound {
                path,
            } => Self::ConfigNotFound {
                path: path.clone(),
            },
            Self::RegistryParseError {
                file,
                reason,
            } => Self::RegistryParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PedigreeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: PedigreeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`PedigreeError`], [`LookupError`], [`std::io::Error`] and
/// [`toml::de::Error`]; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(pedigree_error) = error.downcast_ref::<PedigreeError>() {
        return create_error_context(pedigree_error.clone());
    }

    if let Some(lookup_error) = error.downcast_ref::<LookupError>() {
        return create_error_context(PedigreeError::Lookup(lookup_error.clone()));
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(PedigreeError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check the file ownership and permissions of the config or registry file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(PedigreeError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(PedigreeError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your config file. Verify quotes, brackets, and section names")
        .with_details("Run 'pedigree config init' to write a fresh example configuration");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(PedigreeError::Other {
        message,
    })
}

/// Map each [`PedigreeError`] variant to tailored suggestions and details.
fn create_error_context(error: PedigreeError) -> ErrorContext {
    match &error {
        PedigreeError::BirdNotFound {
            identifier,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check the ring number '{identifier}' for typos. Matching ignores case and surrounding spaces, but not missing characters"
            ))
            .with_details("Only birds registered in your own records can be used as a pedigree subject"),

        PedigreeError::MalformedSubject {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Make sure the bird record has a non-empty identifier (ring number)")
            .with_details("A pedigree can only be built for a bird that can be identified"),

        PedigreeError::Lookup(lookup) => {
            let suggestion = match lookup {
                LookupError::Status {
                    status, ..
                } if *status == 401 || *status == 403 => {
                    "Check the API token in the [lookup] section of your config file"
                }
                LookupError::Timeout {
                    ..
                } => "The lookup service is slow to respond. Raise 'timeout_secs' in the [lookup] section or try again later",
                _ => "Check 'base_url' in the [lookup] section of your config file and your internet connection",
            };
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details("Use --registry <file> to work from an offline export of your records")
        }

        PedigreeError::ConfigError {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Run 'pedigree config show' to check the effective configuration")
            .with_details("Without a lookup service, pass --registry <file> to read an exported registry"),

        PedigreeError::ConfigNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Run 'pedigree config init' to create a configuration file"),

        PedigreeError::RegistryParseError {
            file, ..
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check that {file} is a JSON array of bird records, each with an 'identifier' field"
            )),

        _ => ErrorContext::new(error.clone()),
    }
}
