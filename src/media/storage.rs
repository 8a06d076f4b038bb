use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use super::DecodedImage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid public base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Persists images and resolves them to publicly reachable URLs
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store the image under a fresh key and return its public URL
    async fn put(&self, image: &DecodedImage) -> Result<String, StorageError>;

    /// Remove a previously stored image. URLs this storage did not issue are ignored.
    async fn remove(&self, url: &str) -> Result<(), StorageError>;
}

fn object_key(image: &DecodedImage) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), image.kind.extension())
}

/// Keys are generated here, so anything else in a URL's last segment is foreign
fn is_object_key(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.')
        && !name.starts_with('.')
}

/// Writes images into a directory that the HTTP layer serves under `/uploads`
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base: Url,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, StorageError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if public_base_url.ends_with('/') {
            public_base_url.to_string()
        } else {
            format!("{}/", public_base_url)
        };
        let public_base = Url::parse(&normalized)
            .map_err(|_| StorageError::InvalidBaseUrl(public_base_url.to_string()))?;
        Ok(Self {
            root: root.into(),
            public_base,
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(self.public_base.as_str())?;
        is_object_key(rest).then(|| rest.to_string())
    }
}

#[async_trait]
impl MediaStorage for LocalDiskStorage {
    async fn put(&self, image: &DecodedImage) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let key = object_key(image);
        tokio::fs::write(self.root.join(&key), &image.bytes).await?;
        let url = self
            .public_base
            .join(&key)
            .map_err(|_| StorageError::InvalidBaseUrl(self.public_base.to_string()))?;
        tracing::info!("Stored {} image ({} bytes) as {}", image.kind.mime(), image.bytes.len(), key);
        Ok(url.into())
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let Some(key) = self.key_from_url(url) else {
            return Ok(());
        };
        match tokio::fs::remove_file(self.root.join(&key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests. `failing()` builds one whose writes always fail.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, DecodedImage>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub const BASE_URL: &'static str = "memory://media/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_failing(true);
        storage
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn get(&self, url: &str) -> Option<DecodedImage> {
        let key = url.strip_prefix(Self::BASE_URL)?;
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn put(&self, image: &DecodedImage) -> Result<String, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let key = object_key(image);
        self.objects.write().await.insert(key.clone(), image.clone());
        Ok(format!("{}{}", Self::BASE_URL, key))
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        if let Some(key) = url.strip_prefix(Self::BASE_URL) {
            self.objects.write().await.remove(key);
        }
        Ok(())
    }
}
