//! Collaborator seams consumed by the storage engine.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. Production
//! implementations live in `folio-remote`; tests substitute in-memory
//! fakes.

use async_trait::async_trait;

use crate::digest::Digest;
use crate::error::Result;
use crate::models::Knowledge;

// =============================================================================
// DURABLE OBJECT STORAGE
// =============================================================================

/// Remote durable storage for blob bytes.
///
/// Paths are the digest-derived relative paths of
/// [`Digest::storage_path`](crate::digest::Digest::storage_path); the store
/// treats them as opaque keys. Objects are immutable: `upload` to an
/// existing path must be idempotent on the provider side.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Upload bytes under the given path, returning the provider's locator.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    /// Download the bytes stored under the given path.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete the object at the given path. Deleting a missing object is
    /// not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

// =============================================================================
// REMOTE REGISTRY MIRROR
// =============================================================================

/// Query interface over the hosted mirror of all document registries.
///
/// The mirror sees documents from every project and device, including ones
/// this process has never loaded; it is the authority the reference-safety
/// checker consults before any shared blob is deleted.
#[async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// Number of active (non-trashed) documents anywhere that reference
    /// the digest.
    async fn active_reference_count(&self, digest: &Digest) -> Result<u64>;
}

// =============================================================================
// KNOWLEDGE EXTRACTION
// =============================================================================

/// Best-effort bibliographic metadata extraction.
///
/// Backed by a network call to an AI service; may fail or be rate-limited.
/// Callers treat failure as non-fatal and never retry inside the upload
/// path; the digest-keyed cache means the next upload of the same bytes
/// retries naturally.
#[async_trait]
pub trait KnowledgeExtractor: Send + Sync {
    async fn extract(&self, data: &[u8], media_type: &str) -> Result<Knowledge>;
}
