//! Parent slot resolution.
//!
//! A parent slot arrives in one of three raw forms (see [`ParentLink`]). Resolution
//! turns it into a record or into "no parent":
//!
//! | Slot | Result | Lookup call |
//! |---|---|---|
//! | absent | [`ParentResolution::Absent`] | no |
//! | embedded record | [`ParentResolution::Found`] | no |
//! | bare identifier, exact match | [`ParentResolution::Found`] | yes |
//! | bare identifier, no exact match | [`ParentResolution::Unmatched`] | yes |
//! | bare identifier, lookup failed | [`ParentResolution::Unmatched`] | yes |
//!
//! A failed lookup is logged and then treated exactly like a missing record, so one
//! broken ancestor never aborts the rest of the tree.

use tracing::{debug, warn};

use super::identity::{normalize, select_exact};
use crate::lookup::{BirdLookup, LookupError};
use crate::models::{BirdRef, ParentLink};

/// Outcome of resolving one parent slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ParentResolution {
    /// The parent record, either embedded or looked up.
    Found(BirdRef),
    /// The slot held no usable parent information.
    Absent,
    /// The slot named a parent by identifier, but no record matched (or the lookup
    /// failed). Carries the raw identifier so a presentation layer can show a
    /// placeholder.
    Unmatched(String),
}

impl ParentResolution {
    /// The resolved record, if any.
    #[must_use]
    pub fn into_bird(self) -> Option<BirdRef> {
        match self {
            Self::Found(bird) => Some(bird),
            Self::Absent | Self::Unmatched(_) => None,
        }
    }
}

/// Look up `identifier` and return the candidate that matches it exactly.
///
/// Returns `Ok(None)` for a blank identifier without calling the service. Lookup
/// failures are returned to the caller; [`resolve_parent`] is the tolerant variant.
pub async fn find_exact(
    lookup: &dyn BirdLookup,
    identifier: &str,
) -> Result<Option<BirdRef>, LookupError> {
    let Some(key) = normalize(identifier) else {
        return Ok(None);
    };

    let candidates = lookup.find_by_identifier(&key).await?;
    debug!("Lookup for '{}' returned {} candidate(s)", key, candidates.len());
    Ok(select_exact(candidates, &key))
}

/// Resolve a single parent slot. Never fails.
pub async fn resolve_parent(lookup: &dyn BirdLookup, link: Option<&ParentLink>) -> ParentResolution {
    match link {
        None => ParentResolution::Absent,

        Some(ParentLink::Embedded(parent)) => {
            if normalize(&parent.identifier).is_none() {
                warn!("Ignoring embedded parent record without an identifier");
                ParentResolution::Absent
            } else {
                ParentResolution::Found(parent.as_ref().clone())
            }
        }

        Some(ParentLink::Identifier(code)) => {
            if normalize(code).is_none() {
                return ParentResolution::Absent;
            }

            match find_exact(lookup, code).await {
                Ok(Some(parent)) => ParentResolution::Found(parent),
                Ok(None) => {
                    debug!("Parent '{}' is not in the owner's records", code.trim());
                    ParentResolution::Unmatched(code.trim().to_string())
                }
                Err(e) => {
                    warn!("Lookup for parent '{}' failed, treating as missing: {}", code.trim(), e);
                    ParentResolution::Unmatched(code.trim().to_string())
                }
            }
        }
    }
}
