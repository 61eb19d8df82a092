//! Lecture d'objets dans le stockage (S3, système de fichiers local, mémoire)

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore,
};
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Source des objets GeoJSON
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Lit l'objet complet en mémoire
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, FetchError>;
}

/// Backend de stockage
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Amazon S3 (ou compatible), configuré par les variables `AWS_*`
    S3,
    /// Répertoire local : un sous-répertoire par bucket
    Local { root: PathBuf },
    /// Stores en mémoire indexés par bucket
    Memory(Arc<HashMap<String, Arc<InMemory>>>),
}

impl StorageBackend {
    /// Backend mémoire à partir de stores déjà remplis
    pub fn in_memory(buckets: impl IntoIterator<Item = (String, InMemory)>) -> Self {
        StorageBackend::Memory(Arc::new(
            buckets
                .into_iter()
                .map(|(name, store)| (name, Arc::new(store)))
                .collect(),
        ))
    }
}

/// Lecteur d'objets basé sur `object_store`
///
/// Un client S3 (ou store local) est construit à la première lecture d'un
/// bucket puis réutilisé. Les clones partagent le cache.
#[derive(Debug, Clone)]
pub struct ObjectStoreFetcher {
    backend: StorageBackend,
    stores: Arc<Mutex<HashMap<String, Arc<dyn ObjectStore>>>>,
}

impl ObjectStoreFetcher {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            stores: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn store_for(&self, bucket: &str, key: &str) -> Result<Arc<dyn ObjectStore>, FetchError> {
        if matches!(self.backend, StorageBackend::Memory(_)) {
            return self.build_store(bucket, key);
        }

        let mut stores = self
            .stores
            .lock()
            .map_err(|_| FetchError::Transport("Storage client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store = self.build_store(bucket, key)?;
        debug!(bucket = %bucket, "Storage client created");
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn build_store(&self, bucket: &str, key: &str) -> Result<Arc<dyn ObjectStore>, FetchError> {
        match &self.backend {
            StorageBackend::S3 => {
                let store: Arc<dyn ObjectStore> = Arc::new(AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| {
                        FetchError::Transport(format!("Failed to create S3 client: {}", e))
                    })?);
                Ok(store)
            }
            StorageBackend::Local { root } => {
                if !is_plain_bucket_name(bucket) {
                    return Err(FetchError::Transport(format!(
                        "Invalid bucket name: '{}'",
                        bucket
                    )));
                }
                let dir = root.join(bucket);
                if !dir.is_dir() {
                    return Err(FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                let store: Arc<dyn ObjectStore> =
                    Arc::new(LocalFileSystem::new_with_prefix(&dir).map_err(|e| {
                        FetchError::Transport(format!("Failed to open {}: {}", dir.display(), e))
                    })?);
                Ok(store)
            }
            StorageBackend::Memory(buckets) => {
                let store: Arc<dyn ObjectStore> =
                    buckets.get(bucket).cloned().ok_or_else(|| FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })?;
                Ok(store)
            }
        }
    }
}

/// Un nom de bucket ne doit pas permettre de sortir de la racine locale
fn is_plain_bucket_name(bucket: &str) -> bool {
    !bucket.is_empty()
        && bucket != "."
        && bucket != ".."
        && !bucket.contains(['/', '\\'])
}

#[async_trait]
impl ObjectFetcher for ObjectStoreFetcher {
    #[instrument(skip_all, fields(bucket = %bucket, key = %key))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, FetchError> {
        let store = self.store_for(bucket, key)?;
        // La clé est prise telle quelle, sans encodage des caractères réservés
        let location = Path::parse(key).map_err(|e| {
            FetchError::Transport(format!("Invalid object key '{}': {}", key, e))
        })?;

        let result = store.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => FetchError::Transport(format!("Failed to read {}/{}: {}", bucket, key, other)),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }
}
