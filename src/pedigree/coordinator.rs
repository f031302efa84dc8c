//! Request coordination and staleness protection.
//!
//! A [`BuildCoordinator`] owns the observable [`BuildState`] of one pedigree view.
//! Every call to [`BuildCoordinator::request`] takes a fresh ticket. A build commits
//! its result only if its ticket is still the latest when it finishes; otherwise the
//! result is dropped and [`BuildOutcome::Superseded`] is returned. Ticket issue and
//! the commit check both happen under the watch channel's lock, so an older build can
//! never overwrite a newer one regardless of completion order.
//!
//! In-flight builds are not cancelled; their results are simply discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::request::BuildRequest;
use super::resolve_pedigree;
use super::tree::TreeNode;
use crate::lookup::BirdLookup;

/// Observable state of the current pedigree.
#[derive(Debug, Clone, Default)]
pub enum BuildState {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A build is in flight.
    Loading {
        ticket: u64,
        subject: String,
        generations: u32,
    },
    /// The latest build finished.
    Ready {
        ticket: u64,
        tree: Arc<TreeNode>,
    },
    /// The latest build could not produce a tree.
    Unavailable {
        ticket: u64,
        reason: String,
    },
}

impl BuildState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The committed tree, if the state is [`BuildState::Ready`].
    #[must_use]
    pub fn tree(&self) -> Option<&Arc<TreeNode>> {
        match self {
            Self::Ready {
                tree, ..
            } => Some(tree),
            _ => None,
        }
    }

    /// Ticket of the request this state belongs to; `None` while idle.
    #[must_use]
    pub fn ticket(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Loading {
                ticket, ..
            }
            | Self::Ready {
                ticket, ..
            }
            | Self::Unavailable {
                ticket, ..
            } => Some(*ticket),
        }
    }
}

/// Result of one [`BuildCoordinator::request`] call.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The result became the current state. `None` means the build was unavailable.
    Committed(Option<Arc<TreeNode>>),
    /// A newer request was issued before this one finished; its result was dropped.
    Superseded,
}

impl BuildOutcome {
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Issues builds against one lookup service and keeps only the latest result.
pub struct BuildCoordinator {
    lookup: Arc<dyn BirdLookup>,
    latest: AtomicU64,
    state: watch::Sender<BuildState>,
}

impl std::fmt::Debug for BuildCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildCoordinator")
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl BuildCoordinator {
    #[must_use]
    pub fn new(lookup: Arc<dyn BirdLookup>) -> Self {
        let (state, _) = watch::channel(BuildState::Idle);
        Self {
            lookup,
            latest: AtomicU64::new(0),
            state,
        }
    }

    /// Receiver that observes every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BuildState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> BuildState {
        self.state.borrow().clone()
    }

    /// Build and annotate the pedigree for `request`, committing it only if no newer
    /// request was issued in the meantime.
    pub async fn request(&self, request: BuildRequest) -> BuildOutcome {
        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = BuildState::Loading {
                ticket,
                subject: request.subject.identifier.clone(),
                generations: request.generations,
            };
        });
        info!(
            "Pedigree request #{} for '{}' ({} generations)",
            ticket,
            request.subject.identifier.trim(),
            request.generations
        );

        let next = match resolve_pedigree(self.lookup.as_ref(), &request).await {
            Ok(tree) => BuildState::Ready {
                ticket,
                tree: Arc::new(tree),
            },
            Err(e) => {
                warn!("Pedigree request #{} unavailable: {}", ticket, e);
                BuildState::Unavailable {
                    ticket,
                    reason: e.to_string(),
                }
            }
        };
        let tree = next.tree().cloned();

        let committed = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = next;
            true
        });

        if committed {
            BuildOutcome::Committed(tree)
        } else {
            debug!("Discarding result of superseded request #{}", ticket);
            BuildOutcome::Superseded
        }
    }

    /// Run [`request`](Self::request) on a background task.
    pub fn spawn_request(self: &Arc<Self>, request: BuildRequest) -> JoinHandle<BuildOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.request(request).await })
    }
}
