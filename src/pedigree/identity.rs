//! Identifier normalization.
//!
//! Ring numbers are typed by hand in many places, so comparisons always go through
//! [`normalize`]: surrounding whitespace is trimmed and letters are upper-cased. The
//! stored identifier keeps its original casing.

use crate::models::BirdRef;

/// Canonical comparison form of an identifier, or `None` if nothing is left after
/// trimming.
///
/// ```
/// use pigeon_pedigree::pedigree::identity::normalize;
///
/// assert_eq!(normalize("  nl-2021-1234567 "), Some("NL-2021-1234567".to_string()));
/// assert_eq!(normalize("   "), None);
/// ```
#[must_use]
pub fn normalize(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// [`normalize`] for an optional code; absent input normalizes to `None`.
#[must_use]
pub fn normalize_opt(code: Option<&str>) -> Option<String> {
    code.and_then(normalize)
}

/// Whether two identifiers name the same bird.
///
/// Two blank identifiers are never considered the same bird.
#[must_use]
pub fn same_identity(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Pick the candidate whose normalized identifier equals `key` exactly.
///
/// `key` must already be normalized. When the service returns several exact matches
/// (duplicate records on the backend) the first one wins.
#[must_use]
pub fn select_exact(candidates: Vec<BirdRef>, key: &str) -> Option<BirdRef> {
    let total = candidates.len();
    let mut exact = candidates
        .into_iter()
        .filter(|candidate| normalize(&candidate.identifier).as_deref() == Some(key));

    let chosen = exact.next();
    if chosen.is_some() && exact.next().is_some() {
        tracing::debug!("Multiple exact matches for '{}' among {} candidates, using the first", key, total);
    }
    chosen
}
