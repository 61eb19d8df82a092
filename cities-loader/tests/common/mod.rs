//! Utilitaires de test partagés
//!
//! - `RecordingStore` : `CityStore` en mémoire, atomique, avec panne simulée
//! - `CountingFetcher` : compte les lectures du stockage
//! - construction du routeur avec un stockage objet en mémoire

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use object_store::{memory::InMemory, path::Path, ObjectStore};
use tower::ServiceExt;

use cities_loader::{
    build_router, AppState, CityStore, FetchError, LoadError, LoadReport, ObjectFetcher,
    ObjectStoreFetcher, Pipeline, StorageBackend,
};
use geofeed::CityRow;

/// Store en mémoire : les lignes ne sont visibles qu'après un appel réussi
#[derive(Default)]
pub struct RecordingStore {
    committed: Mutex<Vec<CityRow>>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Échoue à l'insertion de la ligne `index` (0-based)
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<CityRow> {
        self.committed.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CityStore for RecordingStore {
    async fn load(&self, source: &str, rows: &[CityRow]) -> Result<LoadReport, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut pending = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if self.fail_at == Some(index) {
                return Err(LoadError::persistence(
                    &format!("Failed to insert row {}", index),
                    "simulated constraint violation",
                ));
            }
            pending.push(row.clone());
        }

        let rows_inserted = pending.len();
        self.committed.lock().unwrap().extend(pending);

        Ok(LoadReport {
            source: source.to_string(),
            rows_inserted,
        })
    }
}

/// Enveloppe un fetcher et compte les appels
pub struct CountingFetcher {
    inner: ObjectStoreFetcher,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectFetcher for CountingFetcher {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_object(bucket, key).await
    }
}

/// Crée un fetcher en mémoire contenant les objets `(bucket, key, contenu)`
pub async fn memory_fetcher(objects: &[(&str, &str, &str)]) -> Arc<CountingFetcher> {
    let mut buckets: Vec<(String, InMemory)> = Vec::new();

    for (bucket, key, content) in objects {
        if !buckets.iter().any(|(name, _)| name.as_str() == *bucket) {
            buckets.push((bucket.to_string(), InMemory::new()));
        }
        let (_, store) = buckets
            .iter()
            .find(|(name, _)| name.as_str() == *bucket)
            .unwrap();
        store
            .put(&Path::parse(*key).unwrap(), Bytes::from(content.to_string()).into())
            .await
            .unwrap();
    }

    Arc::new(CountingFetcher {
        inner: ObjectStoreFetcher::new(StorageBackend::in_memory(buckets)),
        calls: AtomicUsize::new(0),
    })
}

/// Construit le routeur de test
pub fn test_router(fetcher: Arc<CountingFetcher>, store: Arc<RecordingStore>) -> Router {
    let pipeline = Pipeline::new(fetcher, store);
    build_router(Arc::new(AppState { pipeline }))
}

/// Envoie une requête et retourne le statut et le corps JSON
pub async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Document du scénario Springfield
pub const SPRINGFIELD: &str = r#"{"type":"FeatureCollection","features":[{"geometry":{"type":"Point","coordinates":[1,2]},"properties":{"name":"Springfield","population":100}},{"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{}}]}"#;
