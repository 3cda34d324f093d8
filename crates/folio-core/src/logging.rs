//! Structured logging schema and field name constants for folio.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, dedup hits |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "blob_store", "knowledge_cache", "registry", "gc", "remote"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "put", "sweep", "add_document", "restore"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Project UUID being operated on.
pub const PROJECT_ID: &str = "project_id";

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Content digest in canonical form.
pub const DIGEST: &str = "digest";

/// Media type of the bytes involved.
pub const MEDIA_TYPE: &str = "media_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Byte length of the payload involved.
pub const SIZE_BYTES: &str = "size_bytes";

/// Number of records affected by a bulk operation.
pub const RESULT_COUNT: &str = "result_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
