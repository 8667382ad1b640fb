//! # Persistence Backends
//!
//! Where documents live between editing sessions.
//!
//! - [`MemoryBackend`]: in-process store with call accounting and fault
//!   injection, for hosts that keep content elsewhere and for tests
//! - [`JsonFileBackend`]: one `<document_id>.json` file per document
//!
//! Backends must be idempotent: saving the same content twice leaves the same
//! stored state.

use crate::document::Document;
use crate::errors::{LoadError, SaveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Acknowledgement of a stored document
#[derive(Debug, Clone, PartialEq)]
pub struct SaveAck {
    pub document_id: String,
    pub saved_at: DateTime<Utc>,
}

impl SaveAck {
    pub fn now(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            saved_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn load(&self, document_id: &str) -> Result<Document, LoadError>;

    async fn save(&self, document_id: &str, document: &Document) -> Result<SaveAck, SaveError>;
}

// ============================================================================
// Memory backend
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, Document>>,
    latency: Duration,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    load_calls: AtomicUsize,
    save_calls: AtomicUsize,
    saves_in_flight: AtomicUsize,
    max_saves_in_flight: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored document
    pub fn with_document(self, document_id: impl Into<String>, document: Document) -> Self {
        self.lock().insert(document_id.into(), document);
        self
    }

    /// Delay every load and save by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Last stored version of a document
    pub fn stored(&self, document_id: &str) -> Option<Document> {
        self.lock().get(document_id).cloned()
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Number of save calls received, including failed ones
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Highest number of saves that were running at the same time
    pub fn max_concurrent_saves(&self) -> usize {
        self.max_saves_in_flight.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Document>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decrements the in-flight counter when a save finishes or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn load(&self, document_id: &str) -> Result<Document, LoadError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(LoadError::Backend("memory backend set to fail".to_string()));
        }

        self.stored(document_id)
            .ok_or_else(|| LoadError::NotFound(document_id.to_string()))
    }

    async fn save(&self, document_id: &str, document: &Document) -> Result<SaveAck, SaveError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.saves_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.saves_in_flight);
        self.max_saves_in_flight.fetch_max(running, Ordering::SeqCst);

        self.delay().await;

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SaveError::Backend("memory backend set to fail".to_string()));
        }

        self.lock().insert(document_id.to_string(), document.clone());
        Ok(SaveAck::now(document_id))
    }
}

// ============================================================================
// JSON file backend
// ============================================================================

/// Stores each document as pretty-printed JSON under a root directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `document_id`
    pub fn path_for(&self, document_id: &str) -> Option<PathBuf> {
        if !is_valid_id(document_id) {
            return None;
        }
        Some(self.root.join(format!("{document_id}.json")))
    }

    pub async fn exists(&self, document_id: &str) -> bool {
        match self.path_for(document_id) {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }
}

/// Ids become file names, so keep them to a safe alphabet
fn is_valid_id(document_id: &str) -> bool {
    !document_id.is_empty()
        && document_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn load(&self, document_id: &str) -> Result<Document, LoadError> {
        let path = self
            .path_for(document_id)
            .ok_or_else(|| LoadError::NotFound(document_id.to_string()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(document_id.to_string()))
            }
            Err(e) => return Err(LoadError::Backend(format!("{}: {}", path.display(), e))),
        };

        let document = serde_json::from_slice(&bytes)?;
        tracing::debug!(document_id, path = %path.display(), "loaded document");
        Ok(document)
    }

    async fn save(&self, document_id: &str, document: &Document) -> Result<SaveAck, SaveError> {
        let path = self
            .path_for(document_id)
            .ok_or_else(|| SaveError::Rejected(format!("Invalid document id: {document_id:?}")))?;

        let json = serde_json::to_vec_pretty(document)
            .map_err(|e| SaveError::Rejected(e.to_string()))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SaveError::Backend(format!("{}: {}", self.root.display(), e)))?;

        // Write-then-rename so a crash never leaves a half-written document
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| SaveError::Backend(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| SaveError::Backend(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(document_id, path = %path.display(), bytes = json.len(), "saved document");
        Ok(SaveAck::now(document_id))
    }
}
