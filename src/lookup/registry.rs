//! In-memory lookup backed by an exported registry file.
//!
//! The registry file is JSON, either a plain array of bird records or an object with
//! `birds` and an optional `competitions` map keyed by identifier:
//!
//! ```json
//! {
//!   "birds": [
//!     { "identifier": "NL-2021-1234567", "father": "NL-2018-7654321" },
//!     { "identifier": "NL-2018-7654321", "gender": "male" }
//!   ],
//!   "competitions": {
//!     "NL-2021-1234567": [ { "name": "Barcelona", "placement": 14 } ]
//!   }
//! }
//! ```
//!
//! Queries match as a case-insensitive prefix of the trimmed identifier, the same way
//! the search box of the loft backend behaves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use super::{BirdLookup, LookupFuture};
use crate::core::PedigreeError;
use crate::models::{BirdRef, CompetitionResult};
use crate::pedigree::identity::normalize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    Birds(Vec<BirdRef>),
    Full {
        birds: Vec<BirdRef>,
        #[serde(default)]
        competitions: HashMap<String, Vec<CompetitionResult>>,
    },
}

/// Lookup service over a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct RegistryLookup {
    birds: Vec<BirdRef>,
    competitions: HashMap<String, Vec<CompetitionResult>>,
}

impl RegistryLookup {
    /// Build a registry from records already in memory.
    #[must_use]
    pub fn from_birds(birds: Vec<BirdRef>) -> Self {
        Self {
            birds,
            competitions: HashMap::new(),
        }
    }

    /// Attach a competition history to the bird with this identifier.
    #[must_use]
    pub fn with_competitions(mut self, identifier: &str, results: Vec<CompetitionResult>) -> Self {
        if let Some(key) = normalize(identifier) {
            self.competitions.insert(key, results);
        }
        self
    }

    /// Parse a registry from its JSON text.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, PedigreeError> {
        let file: RegistryFile =
            serde_json::from_str(json).map_err(|e| PedigreeError::RegistryParseError {
                file: origin.to_string(),
                reason: e.to_string(),
            })?;

        let (birds, competitions) = match file {
            RegistryFile::Birds(birds) => (birds, HashMap::new()),
            RegistryFile::Full {
                birds,
                competitions,
            } => (birds, competitions),
        };

        let competitions = competitions
            .into_iter()
            .filter_map(|(id, results)| normalize(&id).map(|key| (key, results)))
            .collect();

        Ok(Self {
            birds,
            competitions,
        })
    }

    /// Load a registry file from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read bird registry from {}", path.display()))?;

        let registry = Self::from_json(&content, &path.display().to_string())?;
        tracing::debug!("Loaded {} birds from registry {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Number of birds in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.birds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.birds.is_empty()
    }

    fn matching(&self, query: &str) -> Vec<BirdRef> {
        let Some(prefix) = normalize(query) else {
            return Vec::new();
        };

        self.birds
            .iter()
            .filter(|bird| normalize(&bird.identifier).is_some_and(|id| id.starts_with(&prefix)))
            .cloned()
            .collect()
    }
}

impl BirdLookup for RegistryLookup {
    fn find_by_identifier<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<BirdRef>> {
        Box::pin(async move { Ok(self.matching(query)) })
    }

    fn competition_history<'a>(
        &'a self,
        identifier: &'a str,
    ) -> LookupFuture<'a, Vec<CompetitionResult>> {
        Box::pin(async move {
            Ok(normalize(identifier)
                .and_then(|key| self.competitions.get(&key).cloned())
                .unwrap_or_default())
        })
    }
}
