//! Opportunistic garbage collection of expired trash.
//!
//! The collector runs at natural checkpoints (workspace open, before an
//! upload), never on a timer. A sweep hard-deletes every document whose
//! retention window has elapsed and, where provably safe, reclaims the
//! blob and cached knowledge behind it. Per-document failures are logged
//! and skipped: a failed sweep degrades to a retry at the next
//! checkpoint, never to a user-visible error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::blob_store::BlobStore;
use crate::knowledge_cache::KnowledgeCache;
use crate::refcheck::ReferenceSafetyChecker;
use crate::registry::DocumentRegistry;

/// Outcome summary of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired documents found.
    pub examined: usize,
    /// Documents hard-deleted.
    pub removed: usize,
    /// Blobs (with their knowledge entries) reclaimed.
    pub blobs_deleted: usize,
    /// Documents skipped because a step failed; retried next sweep.
    pub failures: usize,
}

/// Trash collector over the registry, blob store, and knowledge cache.
pub struct GarbageCollector {
    registry: Arc<DocumentRegistry>,
    blobs: Arc<BlobStore>,
    knowledge: Arc<KnowledgeCache>,
    checker: ReferenceSafetyChecker,
}

impl GarbageCollector {
    pub fn new(
        registry: Arc<DocumentRegistry>,
        blobs: Arc<BlobStore>,
        knowledge: Arc<KnowledgeCache>,
        checker: ReferenceSafetyChecker,
    ) -> Self {
        Self {
            registry,
            blobs,
            knowledge,
            checker,
        }
    }

    /// Sweep at the current wall-clock time.
    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now()).await
    }

    /// Sweep at an explicit time.
    ///
    /// A document whose blob turns out to be unsafe to delete is still
    /// removed; only the shared bytes are preserved. A document whose
    /// blob deletion *fails* is kept trashed so the next sweep retries it.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let expired = self.registry.expired_at(now).await;
        let mut report = SweepReport {
            examined: expired.len(),
            ..Default::default()
        };

        for doc in expired {
            if let Some(digest) = &doc.digest {
                // An earlier document in this same pass may have reclaimed
                // the blob already.
                match self.blobs.exists(digest).await {
                    Ok(false) => {}
                    Ok(true) => {
                        if self
                            .checker
                            .is_safe_to_delete(digest, &[(doc.project_id, doc.id)])
                            .await
                        {
                            match self.blobs.delete(digest).await {
                                Ok(()) => {
                                    report.blobs_deleted += 1;
                                    if let Err(e) = self.knowledge.remove(digest).await {
                                        warn!(digest = %digest, error = %e, "gc: knowledge entry removal failed");
                                    }
                                }
                                Err(e) => {
                                    warn!(
                                        document_id = %doc.id,
                                        digest = %digest,
                                        error = %e,
                                        "gc: blob delete failed, keeping document for retry"
                                    );
                                    report.failures += 1;
                                    continue;
                                }
                            }
                        } else {
                            debug!(document_id = %doc.id, digest = %digest, "gc: blob still referenced, removing document only");
                        }
                    }
                    Err(e) => {
                        warn!(
                            document_id = %doc.id,
                            digest = %digest,
                            error = %e,
                            "gc: blob existence probe failed, keeping document for retry"
                        );
                        report.failures += 1;
                        continue;
                    }
                }
            }

            match self.registry.hard_delete(doc.project_id, doc.id).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!(document_id = %doc.id, error = %e, "gc: hard delete failed");
                    report.failures += 1;
                }
            }
        }

        if report.examined > 0 {
            info!(
                examined = report.examined,
                removed = report.removed,
                blobs_deleted = report.blobs_deleted,
                failures = report.failures,
                "gc: sweep complete"
            );
        }
        report
    }
}
