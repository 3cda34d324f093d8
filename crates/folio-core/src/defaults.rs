//! Centralized default constants for the folio document store.
//!
//! **This module is the single source of truth** for all shared default
//! values. The storage engine and its callers reference these constants
//! instead of defining their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

use tracing::warn;

// =============================================================================
// TRASH RETENTION
// =============================================================================

/// Days a soft-deleted document remains in the trash before it becomes
/// eligible for collection.
///
/// This is a caller-visible contract: trash UI copy quotes it, and a restore
/// is guaranteed to succeed at any point inside the window. Changing it
/// changes when shared blobs may be reclaimed.
pub const TRASH_RETENTION_DAYS: i64 = 10;

/// The retention window as a duration.
pub fn trash_retention() -> chrono::Duration {
    chrono::Duration::days(TRASH_RETENTION_DAYS)
}

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum single-file upload size in bytes (50 MB).
/// Configurable via `FOLIO_MAX_FILE_SIZE_BYTES`.
pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Aggregate blob-storage quota in bytes (2 GB).
/// Configurable via `FOLIO_STORAGE_QUOTA_BYTES`.
///
/// Quota counts stored blob bytes once per digest: a file deduplicated
/// against an already-stored blob costs nothing.
pub const STORAGE_QUOTA_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Maximum filename length (ext4/NTFS compatible).
pub const FILENAME_MAX_LENGTH: usize = 255;

/// Environment variable overriding [`MAX_FILE_SIZE_BYTES`].
pub const ENV_MAX_FILE_SIZE: &str = "FOLIO_MAX_FILE_SIZE_BYTES";

/// Environment variable overriding [`STORAGE_QUOTA_BYTES`].
pub const ENV_STORAGE_QUOTA: &str = "FOLIO_STORAGE_QUOTA_BYTES";

// =============================================================================
// LOCAL LAYOUT
// =============================================================================

/// Subdirectory of the data dir holding locally cached blob bytes.
pub const BLOBS_DIR: &str = "blobs";

/// Subdirectory of the data dir holding cached knowledge entries.
pub const KNOWLEDGE_DIR: &str = "knowledge";

/// Subdirectory of the data dir holding per-project registry files.
pub const REGISTRY_DIR: &str = "registry";

/// Blob metadata index file name, directly under the data dir.
pub const BLOB_INDEX_FILE: &str = "blob-index.json";

// =============================================================================
// LIMITS CONFIGURATION
// =============================================================================

/// Named upload limits enforced by the upload orchestrator.
///
/// Callers see these as configuration, never as hardcoded numbers: quota
/// and size rejections quote the configured values back in the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Per-file size ceiling in bytes.
    pub max_file_bytes: u64,
    /// Aggregate ceiling across all stored blobs in bytes.
    pub quota_bytes: u64,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_SIZE_BYTES,
            quota_bytes: STORAGE_QUOTA_BYTES,
        }
    }
}

impl StoreLimits {
    /// Load limits from environment variables with fallback to defaults.
    pub fn from_env() -> Self {
        let mut limits = Self::default();

        if let Ok(val) = std::env::var(ENV_MAX_FILE_SIZE) {
            if let Ok(bytes) = val.parse::<u64>() {
                limits.max_file_bytes = bytes;
            } else {
                warn!(value = %val, "Invalid FOLIO_MAX_FILE_SIZE_BYTES, using default");
            }
        }

        if let Ok(val) = std::env::var(ENV_STORAGE_QUOTA) {
            if let Ok(bytes) = val.parse::<u64>() {
                limits.quota_bytes = bytes;
            } else {
                warn!(value = %val, "Invalid FOLIO_STORAGE_QUOTA_BYTES, using default");
            }
        }

        limits
    }
}
