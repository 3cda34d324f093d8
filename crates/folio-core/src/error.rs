//! Error types for the folio document store.

use thiserror::Error;
use uuid::Uuid;

use crate::digest::Digest;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Document id already exists within the project
    #[error("Document already exists: {0}")]
    DuplicateDocument(Uuid),

    /// Blob bytes absent from both the local cache and the durable store
    #[error("Blob not found: {0}")]
    BlobNotFound(Digest),

    /// Content digest computation failed
    #[error("Hash computation failed: {0}")]
    HashFailed(String),

    /// File exceeds the per-file size ceiling
    #[error("File too large: {size_bytes} bytes (limit {limit_bytes})")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Upload would exceed the aggregate storage quota
    #[error("Storage quota exceeded: {requested_bytes} bytes requested, {used_bytes} of {quota_bytes} in use")]
    QuotaExceeded {
        requested_bytes: u64,
        used_bytes: u64,
        quota_bytes: u64,
    },

    /// Durable upload failed; no blob was recorded, safe to retry from scratch
    #[error("Durable upload failed: {0}")]
    DurableUpload(String),

    /// Blob metadata record write failed after a successful durable upload.
    /// The durable bytes remain as an orphan; a retried put re-records them.
    #[error("Blob metadata write failed: {0}")]
    BlobMetadata(String),

    /// Metadata extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Reference-safety query against the remote mirror failed
    #[error("Reference check failed: {0}")]
    ReferenceCheck(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
