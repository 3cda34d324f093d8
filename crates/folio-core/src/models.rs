//! Core data models for the folio document store.
//!
//! These types are shared across all folio crates and represent the core
//! domain entities: stored blobs, extracted knowledge, project documents,
//! and their annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults;
use crate::digest::Digest;

// =============================================================================
// FILE BLOBS
// =============================================================================

/// Metadata record for one stored blob.
///
/// Exactly one record exists per digest system-wide; blobs are immutable
/// once written. The bytes themselves live in the local cache and the
/// durable store under [`Digest::storage_path`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBlob {
    pub digest: Digest,
    pub media_type: String,
    pub size_bytes: u64,
    /// Locator reported by the durable store when the bytes were uploaded.
    pub locator: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// KNOWLEDGE
// =============================================================================

/// Extracted bibliographic metadata for a document's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Knowledge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub identifiers: Identifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Extractor-specific fields passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<JsonValue>,
}

impl Knowledge {
    /// Normalize identifier fields into their canonical forms, dropping
    /// values that do not parse.
    pub fn normalized(mut self) -> Self {
        self.identifiers.doi = self.identifiers.doi.as_deref().and_then(normalize_doi);
        self.identifiers.arxiv = self.identifiers.arxiv.as_deref().and_then(normalize_arxiv);
        self
    }
}

/// Persistent identifiers attached to a publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arxiv: Option<String>,
}

/// Normalize a DOI to its bare lowercase form.
///
/// Accepts `doi:` prefixes and resolver URLs. DOIs are case-insensitive by
/// definition, so the canonical form is lowercase.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut s = raw.trim();
    for prefix in [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ] {
        if let Some(rest) = strip_prefix_ignore_case(s, prefix) {
            s = rest;
            break;
        }
    }
    let s = s.trim();
    if s.starts_with("10.") && s.contains('/') {
        Some(s.to_lowercase())
    } else {
        None
    }
}

/// Normalize an arXiv identifier to its bare form, keeping any version
/// suffix (`2301.01234v2`). Old-style ids (`math.GT/0309136`) pass through.
pub fn normalize_arxiv(raw: &str) -> Option<String> {
    let mut s = raw.trim();
    for prefix in ["https://arxiv.org/abs/", "http://arxiv.org/abs/", "arxiv:"] {
        if let Some(rest) = strip_prefix_ignore_case(s, prefix) {
            s = rest;
            break;
        }
    }
    let s = s.trim().trim_end_matches(".pdf");
    if s.is_empty() || s.contains(char::is_whitespace) {
        None
    } else {
        Some(s.to_string())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Cached extraction result keyed by content digest.
///
/// At most one entry exists per digest; the extracted content of an
/// immutable blob never changes, so entries carry no expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub digest: Digest,
    pub knowledge: Knowledge,
    pub extracted_at: DateTime<Utc>,
}

// =============================================================================
// DOCUMENT LIFECYCLE
// =============================================================================

/// Lifecycle state of a document.
///
/// `trash_until` always equals `deleted_at` plus the retention window by
/// construction; the invariant cannot be violated because the pair only
/// exists inside the `Trashed` variant. Expiry is the predicate
/// [`Lifecycle::is_expired`], not a stored state: removal is terminal and
/// handled by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Trashed {
        deleted_at: DateTime<Utc>,
        trash_until: DateTime<Utc>,
    },
}

impl Lifecycle {
    /// Enter the trashed state at `now`, opening the retention window.
    pub fn trashed_at(now: DateTime<Utc>) -> Self {
        Self::Trashed {
            deleted_at: now,
            trash_until: now + defaults::trash_retention(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_trashed(&self) -> bool {
        matches!(self, Self::Trashed { .. })
    }

    /// Whether the retention window has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Active => false,
            Self::Trashed { trash_until, .. } => now >= *trash_until,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Trashed { deleted_at, .. } => Some(*deleted_at),
        }
    }

    pub fn trash_until(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Trashed { trash_until, .. } => Some(*trash_until),
        }
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A project's reference to stored content.
///
/// Many documents, across projects and users, may reference the same
/// digest; the document is the unit of ownership for annotations and the
/// unit of soft deletion, never of the shared bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Caller-generated id, unique within the project.
    pub id: Uuid,
    pub project_id: Uuid,
    /// Content digest of the backing blob. Absent for records created
    /// without an uploaded file (e.g. a bare bibliography entry).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<Digest>,
    pub title: String,
    /// Extracted metadata merged in at creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    pub lifecycle: Lifecycle,
    /// Bumped on every state change.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new active document record.
    pub fn new(id: Uuid, project_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            digest: None,
            title: title.into(),
            metadata: None,
            lifecycle: Lifecycle::Active,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a mutation: bump the version and refresh `updated_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Listing partition for project documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentView {
    Active,
    Trashed,
}

impl std::fmt::Display for DocumentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Trashed => write!(f, "trashed"),
        }
    }
}

impl std::str::FromStr for DocumentView {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "trashed" | "trash" => Ok(Self::Trashed),
            _ => Err(format!("Invalid document view: {}", s)),
        }
    }
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// Kind of annotation attached to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Note,
    Highlight,
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Highlight => write!(f, "highlight"),
        }
    }
}

impl std::str::FromStr for AnnotationKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "highlight" => Ok(Self::Highlight),
            _ => Err(format!("Invalid annotation kind: {}", s)),
        }
    }
}

/// Annotation owned by a document.
///
/// Annotations reference the document id only and share nothing: they are
/// removed unconditionally whenever their owning document is hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub document_id: Uuid,
    pub kind: AnnotationKind,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(
        document_id: Uuid,
        kind: AnnotationKind,
        body: impl Into<String>,
        page: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            document_id,
            kind,
            body: body.into(),
            page,
            created_at: Utc::now(),
        }
    }
}
