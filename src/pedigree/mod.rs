//! Pedigree resolution engine
//!
//! Given a subject bird, this module builds its ancestry tree up to a fixed number of
//! generations, resolving each parent either from the record embedded in the child or
//! through a [`BirdLookup`](crate::lookup::BirdLookup) call.
//!
//! # Pipeline
//!
//! 1. **Identity** ([`identity`]): identifiers are compared trimmed and upper-cased.
//! 2. **Parent resolution** ([`parent`]): each parent slot becomes a record or "no
//!    parent". Lookup failures never escape this step.
//! 3. **Expansion** ([`tree`]): depth-bounded, concurrent across father and mother,
//!    with per-path cycle detection.
//! 4. **Annotation** ([`annotate`]): competition history for the top levels.
//! 5. **Coordination** ([`coordinator`]): only the latest request's tree is ever
//!    published.
//!
//! # Example
//!
//! ```rust,no_run
//! use pigeon_pedigree::lookup::RegistryLookup;
//! use pigeon_pedigree::models::BirdRef;
//! use pigeon_pedigree::pedigree::{BuildRequest, resolve_pedigree};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = RegistryLookup::load(Path::new("birds.json")).await?;
//! let subject = BirdRef::new("NL-2021-1234567").with_father("NL-2018-7654321");
//!
//! let tree = resolve_pedigree(&registry, &BuildRequest::three_generation(subject)).await?;
//! println!("{} nodes", tree.stats().nodes);
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod coordinator;
pub mod identity;
pub mod parent;
pub mod request;
pub mod tree;

pub use annotate::annotate;
pub use coordinator::{BuildCoordinator, BuildOutcome, BuildState};
pub use parent::{ParentResolution, find_exact, resolve_parent};
pub use request::BuildRequest;
pub use tree::{LeafReason, Lineage, TreeNode, TreeStats, build_tree};

use crate::core::PedigreeError;
use crate::lookup::BirdLookup;

/// Expand and annotate the pedigree described by `request`.
///
/// # Errors
///
/// Fails only when the subject itself is malformed. Problems with ancestors show up
/// as missing nodes, never as errors.
pub async fn resolve_pedigree(
    lookup: &dyn BirdLookup,
    request: &BuildRequest,
) -> Result<TreeNode, PedigreeError> {
    let mut tree = build_tree(lookup, &request.subject, request.generations).await?;
    annotate(lookup, &mut tree, request.annotation_levels).await;
    Ok(tree)
}
