//! Shared test doubles and harness for the workspace integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Mutex;
use uuid::Uuid;

use folio_core::{
    Digest, DurableStore, Error, Identifiers, Knowledge, KnowledgeExtractor, RemoteRegistry,
    Result, StoreLimits,
};
use folio_store::{NewDocument, Workspace, WorkspaceConfig};

/// In-memory durable store with failure injection.
#[derive(Default)]
pub struct MemoryDurable {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryDurable {
    pub async fn seed(&self, path: &str, data: &[u8]) {
        self.objects
            .lock()
            .await
            .insert(path.to_string(), data.to_vec());
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn has(&self, path: &str) -> bool {
        self.objects.lock().await.contains_key(path)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DurableStore for MemoryDurable {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::DurableUpload("injected upload failure".to_string()));
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .await
            .insert(path.to_string(), data.to_vec());
        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Request("injected delete failure".to_string()));
        }
        self.objects.lock().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.objects.lock().await.contains_key(path))
    }
}

/// Delegating wrapper so a test can keep a handle to the mock it boxed.
pub struct Shared<T>(pub Arc<T>);

#[async_trait]
impl<T: DurableStore> DurableStore for Shared<T> {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        self.0.upload(path, data).await
    }
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.0.download(path).await
    }
    async fn delete(&self, path: &str) -> Result<()> {
        self.0.delete(path).await
    }
    async fn exists(&self, path: &str) -> Result<bool> {
        self.0.exists(path).await
    }
}

/// Remote mirror stub with per-digest counts and an offline switch.
#[derive(Default)]
pub struct StubRemoteRegistry {
    counts: Mutex<HashMap<Digest, u64>>,
    fail: AtomicBool,
}

impl StubRemoteRegistry {
    pub async fn set_count(&self, digest: &Digest, count: u64) {
        self.counts.lock().await.insert(digest.clone(), count);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteRegistry for StubRemoteRegistry {
    async fn active_reference_count(&self, digest: &Digest) -> Result<u64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::ReferenceCheck("mirror offline".to_string()));
        }
        Ok(self.counts.lock().await.get(digest).copied().unwrap_or(0))
    }
}

/// Extraction stub that counts calls and can be told to fail.
pub struct StubExtractor {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl Default for StubExtractor {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

impl StubExtractor {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KnowledgeExtractor for StubExtractor {
    async fn extract(&self, _data: &[u8], _media_type: &str) -> Result<Knowledge> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Extraction("injected extraction failure".to_string()));
        }
        Ok(Knowledge {
            title: Some("Stubbed Title".to_string()),
            authors: vec!["T. Author".to_string()],
            identifiers: Identifiers {
                doi: Some("10.1000/stub".to_string()),
                arxiv: None,
            },
            ..Default::default()
        })
    }
}

/// The workspace under test plus handles to every mock.
pub struct TestHarness {
    pub workspace: Workspace,
    pub durable: Arc<MemoryDurable>,
    pub remote: Arc<StubRemoteRegistry>,
    pub extractor: Arc<StubExtractor>,
    _dir: TempDir,
}

pub async fn harness() -> TestHarness {
    harness_with_limits(StoreLimits::default()).await
}

pub async fn harness_with_limits(limits: StoreLimits) -> TestHarness {
    init_tracing();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let durable = Arc::new(MemoryDurable::default());
    let remote = Arc::new(StubRemoteRegistry::default());
    let extractor = Arc::new(StubExtractor::default());

    let workspace = Workspace::open(
        WorkspaceConfig::new(dir.path()).with_limits(limits),
        Box::new(Shared(durable.clone())),
        remote.clone(),
        extractor.clone(),
    )
    .await
    .expect("Failed to open workspace");

    TestHarness {
        workspace,
        durable,
        remote,
        extractor,
        _dir: dir,
    }
}

/// A fresh upload with PDF-looking bytes unique to `seed`.
pub fn pdf_upload(title: &str, seed: &str) -> NewDocument {
    NewDocument {
        id: Uuid::now_v7(),
        title: title.to_string(),
        filename: format!("{}.pdf", seed),
        media_type: None,
        bytes: pdf_bytes(seed),
    }
}

/// PDF-magic-prefixed bytes whose digest is determined by `seed`.
pub fn pdf_bytes(seed: &str) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.extend_from_slice(seed.as_bytes());
    bytes
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
