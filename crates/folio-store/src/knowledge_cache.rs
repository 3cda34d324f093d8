//! Digest-keyed cache of extraction results.
//!
//! Pure cache semantics: the cache never triggers extraction and entries
//! never expire, because the extracted content of an immutable blob never
//! changes. One JSON file per digest, fanned out like the blob layout.

use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use folio_core::{defaults, Digest, Knowledge, KnowledgeEntry, Result};

/// Passive, file-backed knowledge cache.
pub struct KnowledgeCache {
    base_path: PathBuf,
}

impl KnowledgeCache {
    /// Create a cache rooted at the workspace data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_path: data_dir.into(),
        }
    }

    fn entry_path(&self, digest: &Digest) -> PathBuf {
        let hex = digest.hex();
        self.base_path
            .join(defaults::KNOWLEDGE_DIR)
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(format!("{}.json", hex))
    }

    /// Check whether an entry exists for the digest.
    pub async fn has(&self, digest: &Digest) -> Result<bool> {
        Ok(fs::try_exists(self.entry_path(digest)).await?)
    }

    /// Fetch the cached entry for a digest.
    ///
    /// A corrupt entry is treated as a miss (and logged): a cache must
    /// never poison reads, and the caller will simply re-extract.
    pub async fn get(&self, digest: &Digest) -> Result<Option<KnowledgeEntry>> {
        let path = self.entry_path(digest);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = fs::read(&path).await?;
        match serde_json::from_slice::<KnowledgeEntry>(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(digest = %digest, error = %e, "knowledge_cache: corrupt entry treated as miss");
                Ok(None)
            }
        }
    }

    /// Record an extraction result for a digest.
    pub async fn put(&self, digest: &Digest, knowledge: Knowledge) -> Result<()> {
        let entry = KnowledgeEntry {
            digest: digest.clone(),
            knowledge,
            extracted_at: Utc::now(),
        };
        let path = self.entry_path(digest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_vec_pretty(&entry)?;
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&raw).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &path).await?;

        debug!(digest = %digest, "knowledge_cache: entry recorded");
        Ok(())
    }

    /// Remove the entry for a digest, if present.
    pub async fn remove(&self, digest: &Digest) -> Result<()> {
        let path = self.entry_path(digest);
        if fs::try_exists(&path).await? {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}
