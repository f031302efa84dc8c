//! Request supersession and the observable build state.

use pigeon_pedigree::models::BirdRef;
use pigeon_pedigree::pedigree::{BuildCoordinator, BuildOutcome, BuildRequest, BuildState};
use pigeon_pedigree::test_utils::ScriptedLookup;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_stale_result_is_discarded() {
    let gate = Arc::new(Semaphore::new(0));
    let lookup = Arc::new(
        ScriptedLookup::new(vec![BirdRef::new("FA"), BirdRef::new("FB")]).gated_on("FA", gate.clone()),
    );
    let coordinator = Arc::new(BuildCoordinator::new(lookup.clone()));

    // (A, 3) blocks on its father lookup
    let first = coordinator.spawn_request(BuildRequest::new(BirdRef::new("A").with_father("FA"), 3));
    timeout(WAIT, lookup.wait_for_call("FA")).await.unwrap();
    assert!(coordinator.current().is_loading());

    // (B, 2) is issued later and finishes first
    let second = coordinator.request(BuildRequest::new(BirdRef::new("B").with_father("FB"), 2)).await;
    let BuildOutcome::Committed(Some(tree_b)) = second else {
        panic!("second request should commit, got {second:?}");
    };
    assert_eq!(tree_b.bird.identifier, "B");

    // Now let (A, 3) finish
    gate.add_permits(1);
    let first = timeout(WAIT, first).await.unwrap().unwrap();
    assert!(first.is_superseded());

    let state = coordinator.current();
    assert_eq!(state.ticket(), Some(2));
    assert_eq!(state.tree().unwrap().bird.identifier, "B");
}

#[tokio::test]
async fn test_latest_of_many_concurrent_requests_wins() {
    let gate = Arc::new(Semaphore::new(0));
    let lookup = Arc::new(ScriptedLookup::new(vec![BirdRef::new("SLOW")]).gated_on("SLOW", gate.clone()));
    let coordinator = Arc::new(BuildCoordinator::new(lookup.clone()));

    let mut handles = Vec::new();
    for i in 0..4 {
        let subject = BirdRef::new(format!("S{i}")).with_father("SLOW");
        handles.push(coordinator.spawn_request(BuildRequest::new(subject, 2)));
        timeout(WAIT, async {
            while lookup.calls().len() < i + 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    gate.add_permits(4);

    let mut committed = Vec::new();
    for (i, handle) in handles.into_iter().enumerate() {
        if !timeout(WAIT, handle).await.unwrap().unwrap().is_superseded() {
            committed.push(i);
        }
    }
    assert_eq!(committed, vec![3]);
    assert_eq!(coordinator.current().tree().unwrap().bird.identifier, "S3");
}

#[tokio::test]
async fn test_unavailable_is_distinct_from_loading_and_ready() {
    let coordinator = BuildCoordinator::new(Arc::new(ScriptedLookup::new(vec![])));
    let mut rx = coordinator.subscribe();

    let outcome = coordinator.request(BuildRequest::new(BirdRef::new("   "), 3)).await;
    assert!(matches!(outcome, BuildOutcome::Committed(None)));

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(matches!(state, BuildState::Unavailable { ticket: 1, .. }));
    assert!(!state.is_loading());
    assert!(state.tree().is_none());
}

#[tokio::test]
async fn test_empty_pedigree_is_ready_not_unavailable() {
    let coordinator = BuildCoordinator::new(Arc::new(ScriptedLookup::new(vec![])));
    coordinator.request(BuildRequest::new(BirdRef::new("LONER"), 4)).await;

    let state = coordinator.current();
    let tree = state.tree().unwrap();
    assert!(tree.is_leaf());
    assert_eq!(tree.leaf, None);
}
