//! # folio-store
//!
//! The folio storage engine: a content-addressable blob store with
//! deduplication, a digest-keyed knowledge cache, per-project document
//! registries with a trash lifecycle, and an opportunistic garbage
//! collector guarded by cross-registry reference-safety checks.
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_store::{Workspace, WorkspaceConfig, NewDocument};
//!
//! let workspace = Workspace::open(
//!     WorkspaceConfig::new("/var/folio"),
//!     durable,     // Box<dyn DurableStore>
//!     remote,      // Arc<dyn RemoteRegistry>
//!     extractor,   // Arc<dyn KnowledgeExtractor>
//! ).await?;
//!
//! let doc = workspace.add_document(project_id, NewDocument {
//!     id: uuid::Uuid::now_v7(),
//!     title: "Attention Is All You Need".into(),
//!     filename: "attention.pdf".into(),
//!     media_type: None,
//!     bytes: pdf_bytes,
//! }).await?;
//! ```

pub mod blob_store;
pub mod gc;
pub mod knowledge_cache;
pub mod local_cache;
pub mod refcheck;
pub mod registry;
pub mod workspace;

// Re-export core types
pub use folio_core::*;

pub use blob_store::BlobStore;
pub use gc::{GarbageCollector, SweepReport};
pub use knowledge_cache::KnowledgeCache;
pub use local_cache::LocalBlobCache;
pub use refcheck::ReferenceSafetyChecker;
pub use registry::DocumentRegistry;
pub use workspace::{NewDocument, Workspace, WorkspaceConfig};
