//! Pigeon Pedigree - ancestry resolution for racing pigeons
//!
//! Given one bird, this crate builds its pedigree: the bird, its sire and dam, their
//! sires and dams, and so on up to a fixed number of generations. Parent records come
//! either embedded in the child record or from a lookup service that maps a ring
//! number to candidate records.
//!
//! # Architecture Overview
//!
//! - The lookup service is a trait ([`lookup::BirdLookup`]). The crate ships an HTTP
//!   client for the loft backend and an in-memory registry for exported files.
//! - The engine ([`pedigree`]) normalizes identifiers, resolves parent slots, expands
//!   the tree concurrently with per-path cycle detection and a hard generation limit,
//!   then annotates the top levels with competition history.
//! - A [`pedigree::BuildCoordinator`] publishes only the most recent request's tree,
//!   so a slow, outdated build can never replace a newer one.
//!
//! Nothing in the engine fails because of an ancestor. Missing, unmatched or
//! unreachable parents simply end their branch; only a malformed subject is an error.
//!
//! # Core Modules
//!
//! - [`models`] - bird records, parent links, competition results
//! - [`pedigree`] - identity, parent resolution, tree building, annotation, coordination
//! - [`lookup`] - the lookup service boundary and its implementations
//! - [`config`] - the user configuration file
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - the `pedigree` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use pigeon_pedigree::lookup::HttpBirdLookup;
//! use pigeon_pedigree::models::BirdRef;
//! use pigeon_pedigree::pedigree::{BuildRequest, resolve_pedigree};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let lookup = HttpBirdLookup::new("https://loft.example.com/api/v1")?
//!     .with_token(Some("secret".to_string()));
//!
//! let subject = BirdRef::new("NL-2021-1234567").with_father("NL-2018-7654321");
//! let tree = resolve_pedigree(&lookup, &BuildRequest::new(subject, 4)).await?;
//!
//! for sire in tree.generation(1) {
//!     println!("{}", sire.bird.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod lookup;
pub mod models;
pub mod pedigree;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
