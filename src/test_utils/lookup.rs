//! Scripted lookup service for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::lookup::{BirdLookup, LookupError, LookupFuture};
use crate::models::{BirdRef, CompetitionResult};
use crate::pedigree::identity::normalize;

/// In-memory [`BirdLookup`] that records every call and can be told to fail or to
/// block on specific identifiers.
///
/// Queries match as a case-insensitive prefix, like the real service, so tests can
/// check that only exact matches are used.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    birds: Vec<BirdRef>,
    histories: HashMap<String, Vec<CompetitionResult>>,
    failing: HashSet<String>,
    failing_history: HashSet<String>,
    gates: HashMap<String, Arc<Semaphore>>,
    calls: Mutex<Vec<String>>,
    history_calls: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn new(birds: Vec<BirdRef>) -> Self {
        Self {
            birds,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_history(mut self, identifier: &str, results: Vec<CompetitionResult>) -> Self {
        self.histories.insert(key(identifier), results);
        self
    }

    /// Fail `find_by_identifier` for this identifier.
    #[must_use]
    pub fn failing_on(mut self, identifier: &str) -> Self {
        self.failing.insert(key(identifier));
        self
    }

    /// Fail `competition_history` for this identifier.
    #[must_use]
    pub fn failing_history_on(mut self, identifier: &str) -> Self {
        self.failing_history.insert(key(identifier));
        self
    }

    /// Block `find_by_identifier` for this identifier until `gate` hands out a permit.
    ///
    /// Each blocked call consumes one permit; release calls with `add_permits`.
    #[must_use]
    pub fn gated_on(mut self, identifier: &str, gate: Arc<Semaphore>) -> Self {
        self.gates.insert(key(identifier), gate);
        self
    }

    /// Queries passed to `find_by_identifier`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Identifiers passed to `competition_history`, in call order.
    pub fn history_calls(&self) -> Vec<String> {
        self.history_calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Wait until `find_by_identifier` has been called with `query`.
    pub async fn wait_for_call(&self, query: &str) {
        let wanted = key(query);
        while !self.calls().iter().any(|call| key(call) == wanted) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

fn key(identifier: &str) -> String {
    normalize(identifier).unwrap_or_default()
}

impl BirdLookup for ScriptedLookup {
    fn find_by_identifier<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<BirdRef>> {
        Box::pin(async move {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(query.to_string());
            let wanted = key(query);

            if let Some(gate) = self.gates.get(&wanted)
                && let Ok(permit) = gate.acquire().await
            {
                permit.forget();
            }

            if self.failing.contains(&wanted) {
                return Err(LookupError::Unavailable {
                    reason: format!("scripted failure for '{query}'"),
                });
            }

            if wanted.is_empty() {
                return Ok(Vec::new());
            }
            Ok(self.birds.iter().filter(|bird| key(&bird.identifier).starts_with(&wanted)).cloned().collect())
        })
    }

    fn competition_history<'a>(
        &'a self,
        identifier: &'a str,
    ) -> LookupFuture<'a, Vec<CompetitionResult>> {
        Box::pin(async move {
            self.history_calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(identifier.to_string());
            let wanted = key(identifier);

            if self.failing_history.contains(&wanted) {
                return Err(LookupError::Unavailable {
                    reason: format!("scripted history failure for '{identifier}'"),
                });
            }
            Ok(self.histories.get(&wanted).cloned().unwrap_or_default())
        })
    }
}
