//! Reference safety: is a digest still needed by anyone, anywhere?
//!
//! A blob is shared across projects, devices, and users. Before the
//! collector may touch one, both the local registry and the remote mirror
//! must agree that no active document references it. A failed remote query
//! fails closed: losing a shared file because the mirror errored is an
//! unacceptable trade against leaking a few bytes.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use folio_core::{Digest, RemoteRegistry};

use crate::registry::DocumentRegistry;

/// Cross-registry reference-safety checker.
pub struct ReferenceSafetyChecker {
    registry: Arc<DocumentRegistry>,
    remote: Arc<dyn RemoteRegistry>,
}

impl ReferenceSafetyChecker {
    pub fn new(registry: Arc<DocumentRegistry>, remote: Arc<dyn RemoteRegistry>) -> Self {
        Self { registry, remote }
    }

    /// True only if no active document anywhere still references the
    /// digest. `exclude` names `(project, id)` pairs being removed in the
    /// same pass, which must not count as referents of their own blob.
    pub async fn is_safe_to_delete(&self, digest: &Digest, exclude: &[(Uuid, Uuid)]) -> bool {
        let local = self.registry.active_references(digest, exclude).await;
        if local > 0 {
            debug!(digest = %digest, local_refs = local, "refcheck: locally referenced");
            return false;
        }

        match self.remote.active_reference_count(digest).await {
            Ok(0) => true,
            Ok(n) => {
                debug!(digest = %digest, remote_refs = n, "refcheck: remotely referenced");
                false
            }
            Err(e) => {
                warn!(digest = %digest, error = %e, "refcheck: remote query failed, failing closed");
                false
            }
        }
    }
}
