//! Bird lookup service boundary
//!
//! The pedigree engine never talks to a database or HTTP API directly. It consumes a
//! [`BirdLookup`], which maps an identifier query to zero or more candidate records.
//! Matching semantics (exact, prefix, fuzzy) belong to the implementation; the engine
//! always picks the exact normalized match itself.
//!
//! Two implementations ship with the crate:
//! - [`HttpBirdLookup`] - the loft management REST backend, with timeouts and retries
//! - [`RegistryLookup`] - an in-memory registry loaded from a JSON export, used for
//!   offline work and tests
//!
//! Implementations return boxed `Send` futures so the engine can fan out father and
//! mother lookups concurrently on any tokio runtime.

mod http;
mod registry;

pub use http::HttpBirdLookup;
pub use registry::RegistryLookup;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use crate::models::{BirdRef, CompetitionResult};

/// Boxed future returned by [`BirdLookup`] operations.
pub type LookupFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LookupError>> + Send + 'a>>;

/// Failure reported by a lookup service.
///
/// The parent resolver folds every one of these into "no match"; they only reach the
/// user when the CLI looks up the subject itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The request never produced a response (DNS, connection refused, reset)
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// The service answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The response body was not the expected JSON
    #[error("invalid response from {url}: {reason}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        reason: String,
    },

    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out after {after_secs}s")]
    Timeout {
        /// Requested URL
        url: String,
        /// Configured timeout
        after_secs: u64,
    },

    /// Service-specific failure from non-HTTP implementations
    #[error("lookup unavailable: {reason}")]
    Unavailable {
        /// Description of the failure
        reason: String,
    },
}

impl LookupError {
    /// Whether retrying the same request might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport {
                ..
            }
            | Self::Timeout {
                ..
            } => true,
            Self::Status {
                status, ..
            } => *status >= 500 || *status == 429,
            Self::Decode {
                ..
            }
            | Self::Unavailable {
                ..
            } => false,
        }
    }
}

/// Read-only access to the owner's bird records.
///
/// The engine treats implementations as stateless, idempotent and side-effect free.
/// Calls for sibling branches may be in flight at the same time and complete in any
/// order.
pub trait BirdLookup: Send + Sync {
    /// Return candidate records whose identifier matches `query`.
    ///
    /// Returning an empty list is the normal "not in records" answer, not an error.
    fn find_by_identifier<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<BirdRef>>;

    /// Return the competition history of the bird with this exact identifier.
    ///
    /// Services without competition data keep the default, an empty history.
    fn competition_history<'a>(
        &'a self,
        _identifier: &'a str,
    ) -> LookupFuture<'a, Vec<CompetitionResult>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
