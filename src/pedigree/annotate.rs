//! Competition history annotation.
//!
//! Annotation runs after expansion and only touches the top `levels` of the tree.
//! Histories are fetched concurrently; a failed fetch leaves that node with an empty
//! history.

use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use super::tree::TreeNode;
use crate::lookup::BirdLookup;
use crate::models::CompetitionResult;

/// Attach competition histories to every node within `levels` of the root.
pub async fn annotate(lookup: &dyn BirdLookup, tree: &mut TreeNode, levels: u32) {
    annotate_node(lookup, tree, levels).await;
}

fn annotate_node<'a>(
    lookup: &'a dyn BirdLookup,
    node: &'a mut TreeNode,
    remaining: u32,
) -> BoxFuture<'a, ()> {
    async move {
        if remaining == 0 {
            return;
        }

        let TreeNode {
            bird,
            father,
            mother,
            competitions,
            ..
        } = node;

        let father = async {
            if let Some(father) = father.as_deref_mut() {
                annotate_node(lookup, father, remaining - 1).await;
            }
        };
        let mother = async {
            if let Some(mother) = mother.as_deref_mut() {
                annotate_node(lookup, mother, remaining - 1).await;
            }
        };

        let (history, (), ()) = futures::join!(fetch_history(lookup, &bird.identifier), father, mother);
        *competitions = history;
    }
    .boxed()
}

/// Competition history of one bird; empty on failure.
pub async fn fetch_history(lookup: &dyn BirdLookup, identifier: &str) -> Vec<CompetitionResult> {
    match lookup.competition_history(identifier.trim()).await {
        Ok(history) => history,
        Err(e) => {
            warn!("Could not load competition history for '{}': {}", identifier.trim(), e);
            Vec::new()
        }
    }
}
