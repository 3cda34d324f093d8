//! Workspace facade: upload orchestration and the document surface.
//!
//! `Workspace` wires the registry, blob store, knowledge cache, and
//! collector together and is the only entry point collaborators call.
//! The upload path commits strictly in order (garbage-collection pass,
//! digest, dedup check, limits, durable put, knowledge, registry record),
//! so an upload abandoned at any point leaves no partially-created
//! document behind.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use folio_core::{
    detect_media_type, validate_file, Annotation, AnnotationKind, Digest, Document, DocumentView,
    DurableStore, Error, Knowledge, KnowledgeExtractor, RemoteRegistry, Result, StoreLimits,
};

use crate::blob_store::BlobStore;
use crate::gc::{GarbageCollector, SweepReport};
use crate::knowledge_cache::KnowledgeCache;
use crate::refcheck::ReferenceSafetyChecker;
use crate::registry::DocumentRegistry;

/// Configuration for opening a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Root directory for the local cache, registry, and indexes.
    pub data_dir: PathBuf,
    /// Upload limits; defaults come from `folio_core::defaults`.
    pub limits: StoreLimits,
}

impl WorkspaceConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            limits: StoreLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// A file arriving in a project.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Caller-generated id, unique within the project.
    pub id: Uuid,
    /// Display title; when empty, falls back to the extracted title, then
    /// the filename.
    pub title: String,
    pub filename: String,
    /// Claimed media type; magic-byte detection takes precedence.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The document workspace: everything callers see.
pub struct Workspace {
    registry: Arc<DocumentRegistry>,
    blobs: Arc<BlobStore>,
    knowledge: Arc<KnowledgeCache>,
    extractor: Arc<dyn KnowledgeExtractor>,
    gc: GarbageCollector,
    limits: StoreLimits,
}

impl Workspace {
    /// Open a workspace over the given data directory and collaborators.
    ///
    /// Runs an opportunistic trash sweep as part of opening.
    pub async fn open(
        config: WorkspaceConfig,
        durable: Box<dyn DurableStore>,
        remote: Arc<dyn RemoteRegistry>,
        extractor: Arc<dyn KnowledgeExtractor>,
    ) -> Result<Self> {
        let registry = Arc::new(DocumentRegistry::open(&config.data_dir).await?);
        let blobs = Arc::new(BlobStore::open(&config.data_dir, durable).await?);
        let knowledge = Arc::new(KnowledgeCache::new(&config.data_dir));
        let checker = ReferenceSafetyChecker::new(registry.clone(), remote);
        let gc = GarbageCollector::new(
            registry.clone(),
            blobs.clone(),
            knowledge.clone(),
            checker,
        );

        let workspace = Self {
            registry,
            blobs,
            knowledge,
            extractor,
            gc,
            limits: config.limits,
        };

        let report = workspace.gc.sweep().await;
        debug!(removed = report.removed, "workspace: opening sweep done");
        Ok(workspace)
    }

    /// Add a file to a project.
    ///
    /// Identical bytes are deduplicated: a digest the store already holds
    /// skips the size and quota checks entirely and reuses any cached
    /// knowledge, so re-uploading a shared file costs neither quota nor an
    /// extraction call.
    pub async fn add_document(&self, project_id: Uuid, file: NewDocument) -> Result<Document> {
        // Free space before checking quota.
        self.gc.sweep().await;

        let digest = Digest::compute(&file.bytes);
        let size_bytes = file.bytes.len() as u64;
        let media_type = detect_media_type(&file.filename, &file.bytes, file.media_type.as_deref());

        if self.blobs.exists(&digest).await? {
            debug!(digest = %digest, "workspace: dedup hit, skipping limits and upload");
            // Metadata no-op for a recorded blob; re-records it for an
            // orphan left by an interrupted upload.
            self.blobs.put(&digest, &file.bytes, &media_type).await?;
        } else {
            if size_bytes > self.limits.max_file_bytes {
                return Err(Error::FileTooLarge {
                    size_bytes,
                    limit_bytes: self.limits.max_file_bytes,
                });
            }
            let verdict = validate_file(&file.filename, &file.bytes, self.limits.max_file_bytes);
            if !verdict.allowed {
                return Err(Error::InvalidInput(
                    verdict
                        .block_reason
                        .unwrap_or_else(|| "file rejected".to_string()),
                ));
            }
            let used_bytes = self.blobs.usage().await;
            if used_bytes + size_bytes > self.limits.quota_bytes {
                return Err(Error::QuotaExceeded {
                    requested_bytes: size_bytes,
                    used_bytes,
                    quota_bytes: self.limits.quota_bytes,
                });
            }
            self.blobs.put(&digest, &file.bytes, &media_type).await?;
        }

        let knowledge = self.knowledge_for(&digest, &file.bytes, &media_type).await;

        let title = pick_title(&file.title, knowledge.as_ref(), &file.filename);
        let mut doc = Document::new(file.id, project_id, title);
        doc.digest = Some(digest.clone());
        doc.metadata = knowledge.and_then(|k| match serde_json::to_value(&k) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(digest = %digest, error = %e, "workspace: knowledge not serializable, storing none");
                None
            }
        });

        let doc = self.registry.create(doc).await?;
        info!(
            project_id = %project_id,
            document_id = %doc.id,
            digest = %digest,
            size_bytes,
            media_type = %media_type,
            "workspace: document added"
        );
        Ok(doc)
    }

    /// Cached knowledge for the digest, or a best-effort extraction.
    ///
    /// Extraction failure is non-fatal: the document is still created,
    /// just without enriched metadata. The cache is passive: it is only
    /// ever filled here, after a successful extraction.
    async fn knowledge_for(
        &self,
        digest: &Digest,
        bytes: &[u8],
        media_type: &str,
    ) -> Option<Knowledge> {
        match self.knowledge.get(digest).await {
            Ok(Some(entry)) => {
                debug!(digest = %digest, "workspace: knowledge cache hit");
                return Some(entry.knowledge);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(digest = %digest, error = %e, "workspace: knowledge cache read failed");
            }
        }

        match self.extractor.extract(bytes, media_type).await {
            Ok(knowledge) => {
                let knowledge = knowledge.normalized();
                if let Err(e) = self.knowledge.put(digest, knowledge.clone()).await {
                    warn!(digest = %digest, error = %e, "workspace: knowledge cache write failed");
                }
                Some(knowledge)
            }
            Err(e) => {
                warn!(digest = %digest, error = %e, "workspace: extraction failed, continuing without enrichment");
                None
            }
        }
    }

    /// Move documents to the trash, opening their ten-day retention
    /// windows. Idempotent per id; returns how many changed state.
    pub async fn delete_documents(&self, project_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        let changed = self
            .registry
            .soft_delete_at(project_id, ids, Utc::now())
            .await?;
        info!(project_id = %project_id, result_count = changed, "workspace: documents trashed");
        Ok(changed)
    }

    /// Restore trashed documents to the active state.
    pub async fn restore_documents(&self, project_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        let changed = self.registry.restore(project_id, ids).await?;
        info!(project_id = %project_id, result_count = changed, "workspace: documents restored");
        Ok(changed)
    }

    /// List a project's documents, active or trashed, newest first.
    pub async fn list_documents(
        &self,
        project_id: Uuid,
        view: DocumentView,
    ) -> Result<Vec<Document>> {
        self.registry.list(project_id, view).await
    }

    /// Read a document's bytes and media type.
    pub async fn read_document(&self, project_id: Uuid, id: Uuid) -> Result<(Vec<u8>, String)> {
        let doc = self.registry.get(project_id, id).await?;
        let digest = doc
            .digest
            .ok_or_else(|| Error::NotFound(format!("document {} has no stored file", id)))?;
        let media_type = self
            .blobs
            .meta(&digest)
            .await
            .map(|m| m.media_type)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = self.blobs.get(&digest).await?;
        Ok((bytes, media_type))
    }

    /// Attach an annotation to a document.
    pub async fn annotate(
        &self,
        project_id: Uuid,
        document_id: Uuid,
        kind: AnnotationKind,
        body: impl Into<String>,
        page: Option<u32>,
    ) -> Result<Annotation> {
        self.registry
            .add_annotation(project_id, Annotation::new(document_id, kind, body, page))
            .await
    }

    /// List a document's annotations.
    pub async fn annotations(&self, project_id: Uuid, document_id: Uuid) -> Result<Vec<Annotation>> {
        self.registry.list_annotations(project_id, document_id).await
    }

    /// Run a trash sweep now.
    pub async fn sweep_trash(&self) -> SweepReport {
        self.gc.sweep().await
    }

    /// Run a trash sweep as of an explicit time.
    pub async fn sweep_trash_at(&self, now: DateTime<Utc>) -> SweepReport {
        self.gc.sweep_at(now).await
    }

    /// Aggregate bytes currently counted against the quota.
    pub async fn storage_usage(&self) -> u64 {
        self.blobs.usage().await
    }

    /// The limits this workspace enforces.
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Whether the store holds a blob for the digest.
    pub async fn blob_exists(&self, digest: &Digest) -> Result<bool> {
        self.blobs.exists(digest).await
    }

    /// Whether a knowledge entry is cached for the digest.
    pub async fn knowledge_cached(&self, digest: &Digest) -> Result<bool> {
        self.knowledge.has(digest).await
    }
}

fn pick_title(given: &str, knowledge: Option<&Knowledge>, filename: &str) -> String {
    let given = given.trim();
    if !given.is_empty() {
        return given.to_string();
    }
    if let Some(title) = knowledge.and_then(|k| k.title.as_deref()) {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    filename.to_string()
}
