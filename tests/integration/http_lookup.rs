//! `HttpBirdLookup` against an in-process fake loft backend.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pigeon_pedigree::lookup::{BirdLookup, HttpBirdLookup, LookupError};
use pigeon_pedigree::models::{BirdRef, CompetitionResult};
use pigeon_pedigree::pedigree::{BuildRequest, resolve_pedigree};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const TOKEN: &str = "secret";

/// Fake backend state: records, an injectable run of 503s and a hit counter.
#[derive(Clone, Default)]
pub struct Backend {
    birds: Arc<Vec<BirdRef>>,
    competitions: Arc<HashMap<String, Vec<CompetitionResult>>>,
    failures_left: Arc<AtomicUsize>,
    hits: Arc<AtomicUsize>,
}

impl Backend {
    pub fn new(birds: Vec<BirdRef>) -> Self {
        Self {
            birds: Arc::new(birds),
            ..Self::default()
        }
    }

    pub fn with_competitions(mut self, identifier: &str, results: Vec<CompetitionResult>) -> Self {
        let mut map = (*self.competitions).clone();
        map.insert(identifier.to_uppercase(), results);
        self.competitions = Arc::new(map);
        self
    }

    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn admit(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.hits.fetch_add(1, Ordering::SeqCst);

        let expected = format!("Bearer {TOKEN}");
        if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok() {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(())
    }
}

async fn find_birds(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(status) = backend.admit(&headers) {
        return status.into_response();
    }

    let prefix = params.get("identifier").map(|q| q.trim().to_uppercase()).unwrap_or_default();
    let found: Vec<BirdRef> = backend
        .birds
        .iter()
        .filter(|b| !prefix.is_empty() && b.identifier.to_uppercase().starts_with(&prefix))
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn competitions(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(identifier): Path<String>,
) -> Response {
    if let Err(status) = backend.admit(&headers) {
        return status.into_response();
    }

    match backend.competitions.get(&identifier.to_uppercase()) {
        Some(results) => Json(results.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(Vec::<BirdRef>::new()).into_response()
}

/// Serve `backend` on an ephemeral port and return its base URL.
pub async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/birds", get(find_birds))
        .route("/api/birds/:identifier/competitions", get(competitions))
        .route("/slow/birds", get(slow))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/api")
}

fn loft() -> Vec<BirdRef> {
    vec![
        BirdRef::new("NL-1").with_father("NL-2").with_mother("NL-404"),
        BirdRef::new("NL-10"),
        BirdRef::new("NL-2").with_father(BirdRef::new("NL-3").with_name("embedded")),
        BirdRef::new("NL-3"),
    ]
}

fn client(base_url: &str) -> HttpBirdLookup {
    HttpBirdLookup::new(base_url).unwrap().with_token(Some(TOKEN.to_string())).with_retries(0)
}

#[tokio::test]
async fn test_find_by_identifier_returns_candidates() {
    let backend = Backend::new(loft());
    let base = spawn_backend(backend.clone()).await;

    let found = client(&base).find_by_identifier("nl-1").await.unwrap();
    let ids: Vec<_> = found.iter().map(|b| b.identifier.as_str()).collect();
    assert_eq!(ids, vec!["NL-1", "NL-10"]);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_missing_token_is_not_retried() {
    let backend = Backend::new(loft());
    let base = spawn_backend(backend.clone()).await;

    let lookup = HttpBirdLookup::new(&base).unwrap().with_retries(3);
    let err = lookup.find_by_identifier("NL-1").await.unwrap_err();
    assert!(matches!(err, LookupError::Status { status: 401, .. }));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let backend = Backend::new(loft()).failing_first(2);
    let base = spawn_backend(backend.clone()).await;

    let found = client(&base).with_retries(2).find_by_identifier("NL-3").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(backend.hits(), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let backend = Backend::new(loft()).failing_first(10);
    let base = spawn_backend(backend.clone()).await;

    let err = client(&base).with_retries(1).find_by_identifier("NL-3").await.unwrap_err();
    assert!(matches!(err, LookupError::Status { status: 503, .. }));
    assert!(err.is_transient());
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_competition_history_and_not_found() {
    let backend =
        Backend::new(loft()).with_competitions("NL-1", vec![CompetitionResult::new("Pau").with_placement(2)]);
    let base = spawn_backend(backend).await;
    let lookup = client(&base);

    let history = lookup.competition_history("nl-1").await.unwrap();
    assert_eq!(history[0].name, "Pau");
    assert!(lookup.competition_history("NL-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api")).find_by_identifier("NL-1").await.unwrap_err();
    assert!(matches!(err, LookupError::Transport { .. }));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let base = spawn_backend(Backend::default()).await;
    let slow_base = base.replace("/api", "/slow");

    let lookup = client(&slow_base).with_timeout(Duration::from_millis(200));
    let err = lookup.find_by_identifier("NL-1").await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout { .. }));
}

#[tokio::test]
async fn test_pedigree_over_http() {
    let backend =
        Backend::new(loft()).with_competitions("NL-1", vec![CompetitionResult::new("Dax")]);
    let base = spawn_backend(backend).await;
    let lookup = client(&base);

    let subject = lookup
        .find_by_identifier("NL-1")
        .await
        .unwrap()
        .into_iter()
        .find(|b| b.identifier == "NL-1")
        .unwrap();
    let tree = resolve_pedigree(&lookup, &BuildRequest::new(subject, 3)).await.unwrap();

    let sire = tree.father.as_deref().unwrap();
    assert_eq!(sire.bird.identifier, "NL-2");
    assert_eq!(sire.father.as_deref().unwrap().bird.name.as_deref(), Some("embedded"));
    assert!(tree.mother.is_none());
    assert_eq!(tree.unresolved_mother.as_deref(), Some("NL-404"));
    assert_eq!(tree.competitions[0].name, "Dax");
}
