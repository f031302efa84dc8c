//! Build request conventions.

use crate::constants::{DEFAULT_ANNOTATION_LEVELS, PRINT_ANNOTATION_LEVELS, PRINT_GENERATIONS};
use crate::models::BirdRef;
use crate::pedigree::identity::normalize;

/// What to build: the subject, how far up to expand, and how many levels to annotate
/// with competition history.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub subject: BirdRef,
    /// Maximum number of generations above the subject.
    pub generations: u32,
    /// Levels that receive competition history: 1 is the root only, 2 adds the
    /// parents, 0 disables annotation.
    pub annotation_levels: u32,
}

impl BuildRequest {
    /// Open-ended request: caller-chosen depth, history on the root only.
    #[must_use]
    pub fn new(subject: BirdRef, generations: u32) -> Self {
        Self {
            subject,
            generations,
            annotation_levels: DEFAULT_ANNOTATION_LEVELS,
        }
    }

    /// Print/export convention: three generations, history on the root and its
    /// parents.
    #[must_use]
    pub fn three_generation(subject: BirdRef) -> Self {
        Self {
            subject,
            generations: PRINT_GENERATIONS,
            annotation_levels: PRINT_ANNOTATION_LEVELS,
        }
    }

    #[must_use]
    pub fn with_annotation_levels(mut self, levels: u32) -> Self {
        self.annotation_levels = levels;
        self
    }

    /// Normalized subject identifier and depth. Two requests with the same key ask
    /// for the same tree.
    #[must_use]
    pub fn key(&self) -> (Option<String>, u32) {
        (normalize(&self.subject.identifier), self.generations)
    }
}
