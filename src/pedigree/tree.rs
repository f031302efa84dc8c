//! Recursive, cycle-safe, depth-bounded ancestry expansion.
//!
//! Expansion starts at the subject and walks father and mother slots breadth-agnostic:
//! both slots of a node are resolved and expanded concurrently. Every path from the
//! root carries its own [`Lineage`], the set of normalized identifiers already on that
//! path. A bird that shows up again on its own path becomes a [`LeafReason::Cycle`]
//! leaf instead of being expanded again. The same bird on two *different* paths
//! (a common ancestor) is expanded independently on each.
//!
//! Expansion stops when the depth budget is spent; the node at the boundary is kept as
//! a [`LeafReason::Truncated`] leaf so renderers can show that the tree continues.

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use super::identity::normalize;
use super::parent::{ParentResolution, resolve_parent};
use crate::core::PedigreeError;
use crate::lookup::BirdLookup;
use crate::models::{BirdRef, CompetitionResult, ParentSlot};

/// Why a node was not expanded further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafReason {
    /// The generation limit was reached at this node.
    Truncated,
    /// The bird already appears between the root and this node.
    Cycle,
}

/// One node in a resolved pedigree.
///
/// `bird` never carries raw parent links; the resolved parents live in `father` and
/// `mother` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub bird: BirdRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<Box<TreeNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<Box<TreeNode>>,

    /// Set when expansion stopped at this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<LeafReason>,

    /// Father identifier that was named on the record but could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_father: Option<String>,

    /// Mother identifier that was named on the record but could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_mother: Option<String>,

    /// Competition history, filled in by annotation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competitions: Vec<CompetitionResult>,
}

impl TreeNode {
    /// Node without parents.
    #[must_use]
    pub fn new(bird: &BirdRef) -> Self {
        Self {
            bird: bird.without_parents(),
            father: None,
            mother: None,
            leaf: None,
            unresolved_father: None,
            unresolved_mother: None,
            competitions: Vec::new(),
        }
    }

    /// Node that expansion stopped at.
    #[must_use]
    pub fn leaf(bird: &BirdRef, reason: LeafReason) -> Self {
        Self {
            leaf: Some(reason),
            ..Self::new(bird)
        }
    }

    #[must_use]
    pub fn parent(&self, slot: ParentSlot) -> Option<&TreeNode> {
        match slot {
            ParentSlot::Father => self.father.as_deref(),
            ParentSlot::Mother => self.mother.as_deref(),
        }
    }

    /// Raw identifier of a parent that was named but not found.
    #[must_use]
    pub fn unresolved(&self, slot: ParentSlot) -> Option<&str> {
        match slot {
            ParentSlot::Father => self.unresolved_father.as_deref(),
            ParentSlot::Mother => self.unresolved_mother.as_deref(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    /// Number of edges on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> u32 {
        let father = self.father.as_deref().map_or(0, |n| n.depth() + 1);
        let mother = self.mother.as_deref().map_or(0, |n| n.depth() + 1);
        father.max(mother)
    }

    /// Nodes exactly `generation` edges below this one, father side first.
    #[must_use]
    pub fn generation(&self, generation: u32) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        self.collect_generation(generation, &mut out);
        out
    }

    fn collect_generation<'a>(&'a self, remaining: u32, out: &mut Vec<&'a TreeNode>) {
        if remaining == 0 {
            out.push(self);
            return;
        }
        for parent in [self.father.as_deref(), self.mother.as_deref()].into_iter().flatten() {
            parent.collect_generation(remaining - 1, out);
        }
    }

    /// Visit every node depth-first with its distance from this node.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TreeNode, u32),
    {
        fn inner<F: FnMut(&TreeNode, u32)>(node: &TreeNode, depth: u32, visit: &mut F) {
            visit(node, depth);
            if let Some(father) = node.father.as_deref() {
                inner(father, depth + 1, visit);
            }
            if let Some(mother) = node.mother.as_deref() {
                inner(mother, depth + 1, visit);
            }
        }
        inner(self, 0, &mut visit);
    }

    /// Summary counts over the whole tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();

        self.walk(|node, depth| {
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            match node.leaf {
                Some(LeafReason::Truncated) => stats.truncated_leaves += 1,
                Some(LeafReason::Cycle) => stats.cycle_leaves += 1,
                None => {}
            }
            stats.unresolved_parents += usize::from(node.unresolved_father.is_some())
                + usize::from(node.unresolved_mother.is_some());
            if let Some(key) = normalize(&node.bird.identifier) {
                *seen.entry(key).or_default() += 1;
            }
        });

        stats.repeated_ancestors =
            seen.into_iter().filter(|(_, count)| *count > 1).map(|(key, _)| key).collect();
        stats
    }
}

/// Summary of a resolved tree, used by the CLI footer and JSON export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Total nodes including the root.
    pub nodes: usize,
    /// Edges on the longest root-to-leaf path.
    pub depth: u32,
    pub truncated_leaves: usize,
    pub cycle_leaves: usize,
    /// Parent identifiers named on records but not found.
    pub unresolved_parents: usize,
    /// Normalized identifiers that occur more than once (common ancestors and
    /// cycle leaves), sorted.
    pub repeated_ancestors: Vec<String>,
}

/// Normalized identifiers on the path from the root to the node being expanded.
///
/// Each branch gets its own copy, so siblings never see each other's ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    keys: HashSet<String>,
}

impl Lineage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Copy of this lineage with `key` added.
    #[must_use]
    pub fn extended(&self, key: String) -> Self {
        let mut keys = self.keys.clone();
        keys.insert(key);
        Self {
            keys,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Expand the ancestry of `subject` to at most `generations` levels above it.
///
/// With `generations == 0` the result is the subject alone, marked truncated, and no
/// lookups are made.
///
/// # Errors
///
/// Returns [`PedigreeError::MalformedSubject`] if the subject has no identifier.
/// Lookup failures below the root never fail the build.
pub async fn build_tree(
    lookup: &dyn BirdLookup,
    subject: &BirdRef,
    generations: u32,
) -> Result<TreeNode, PedigreeError> {
    if normalize(&subject.identifier).is_none() {
        return Err(PedigreeError::MalformedSubject {
            reason: "subject has no identifier".to_string(),
        });
    }

    debug!("Building {}-generation pedigree for '{}'", generations, subject.identifier.trim());
    Ok(expand(lookup, subject.clone(), generations, Lineage::new()).await)
}

fn expand(
    lookup: &dyn BirdLookup,
    bird: BirdRef,
    depth_remaining: u32,
    lineage: Lineage,
) -> BoxFuture<'_, TreeNode> {
    async move {
        if depth_remaining == 0 {
            trace!("Generation limit reached at '{}'", bird.identifier);
            return TreeNode::leaf(&bird, LeafReason::Truncated);
        }

        // Identifiers are validated at the root and the resolver never yields blank ones
        let key = normalize(&bird.identifier).unwrap_or_default();
        if lineage.contains(&key) {
            debug!("Cycle detected at '{}', stopping this branch", bird.identifier);
            return TreeNode::leaf(&bird, LeafReason::Cycle);
        }
        let lineage = lineage.extended(key);

        let (father, mother) = futures::join!(
            expand_slot(lookup, &bird, ParentSlot::Father, depth_remaining - 1, &lineage),
            expand_slot(lookup, &bird, ParentSlot::Mother, depth_remaining - 1, &lineage),
        );

        let mut node = TreeNode::new(&bird);
        (node.father, node.unresolved_father) = father.into_parts();
        (node.mother, node.unresolved_mother) = mother.into_parts();
        node
    }
    .boxed()
}

enum Branch {
    Node(Box<TreeNode>),
    Unresolved(String),
    Empty,
}

impl Branch {
    fn into_parts(self) -> (Option<Box<TreeNode>>, Option<String>) {
        match self {
            Self::Node(node) => (Some(node), None),
            Self::Unresolved(code) => (None, Some(code)),
            Self::Empty => (None, None),
        }
    }
}

async fn expand_slot(
    lookup: &dyn BirdLookup,
    child: &BirdRef,
    slot: ParentSlot,
    depth_remaining: u32,
    lineage: &Lineage,
) -> Branch {
    match resolve_parent(lookup, child.parent(slot)).await {
        ParentResolution::Found(parent) => {
            Branch::Node(Box::new(expand(lookup, parent, depth_remaining, lineage.clone()).await))
        }
        ParentResolution::Unmatched(code) => Branch::Unresolved(code),
        ParentResolution::Absent => Branch::Empty,
    }
}
