//! Deduplicating blob store: local cache + durable store + metadata index.
//!
//! Blobs are keyed by content digest and written at most once: `put` for a
//! digest the index already knows is a no-op, and a `put` that finds the
//! bytes already durable (an orphan from an earlier interrupted upload)
//! only re-records the metadata. Concurrent `put`s for the same digest are
//! safe without locking the upload itself: the content-addressed path
//! makes a duplicate durable write byte-identical, and the index insert is
//! first-writer-wins.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use folio_core::{defaults, Digest, DurableStore, Error, FileBlob, Result};

use crate::local_cache::LocalBlobCache;

/// On-disk form of the blob metadata index.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BlobIndexFile {
    blobs: Vec<FileBlob>,
}

/// Content-addressed blob storage with upload-once semantics.
pub struct BlobStore {
    cache: LocalBlobCache,
    durable: Box<dyn DurableStore>,
    index_path: PathBuf,
    index: RwLock<HashMap<Digest, FileBlob>>,
}

impl BlobStore {
    /// Open the store rooted at `data_dir`, loading the metadata index.
    ///
    /// Runs the local-cache health check; a data dir that cannot complete a
    /// write/read/delete round trip fails the open.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        durable: Box<dyn DurableStore>,
    ) -> Result<Self> {
        let data_dir: PathBuf = data_dir.into();
        let cache = LocalBlobCache::new(&data_dir);
        cache.validate().await.map_err(Error::Config)?;

        let index_path = data_dir.join(defaults::BLOB_INDEX_FILE);
        let mut index = HashMap::new();
        if fs::try_exists(&index_path).await? {
            let raw = fs::read(&index_path).await?;
            let file: BlobIndexFile = serde_json::from_slice(&raw)?;
            for blob in file.blobs {
                index.insert(blob.digest.clone(), blob);
            }
        }
        debug!(blob_count = index.len(), "blob_store: index loaded");

        Ok(Self {
            cache,
            durable,
            index_path,
            index: RwLock::new(index),
        })
    }

    /// Check whether a blob exists for the digest: metadata index first,
    /// then the durable store (covers orphans from interrupted uploads).
    pub async fn exists(&self, digest: &Digest) -> Result<bool> {
        if self.index.read().await.contains_key(digest) {
            return Ok(true);
        }
        self.durable.exists(&digest.storage_path()).await
    }

    /// Store bytes under their digest. No-op if the digest is already
    /// recorded; this is the dedup guarantee.
    ///
    /// If the durable store already holds the bytes but the metadata record
    /// is missing (orphaned blob), the upload is skipped and only the
    /// record is written; a failed earlier `put` therefore self-heals on
    /// retry.
    pub async fn put(&self, digest: &Digest, data: &[u8], media_type: &str) -> Result<()> {
        if self.index.read().await.contains_key(digest) {
            debug!(digest = %digest, "blob_store: put dedup hit");
            return Ok(());
        }

        let path = digest.storage_path();
        let locator = if self.durable.exists(&path).await? {
            debug!(digest = %digest, "blob_store: durable bytes already present, re-recording metadata");
            path.clone()
        } else {
            self.durable
                .upload(&path, data)
                .await
                .map_err(|e| Error::DurableUpload(e.to_string()))?
        };

        // Cache locally; the durable copy is authoritative, so a cache
        // failure only costs a later download.
        if let Err(e) = self.cache.write(&path, data).await {
            warn!(digest = %digest, error = %e, "blob_store: local cache write failed");
        }

        let blob = FileBlob {
            digest: digest.clone(),
            media_type: media_type.to_string(),
            size_bytes: data.len() as u64,
            locator,
            created_at: Utc::now(),
        };

        let mut index = self.index.write().await;
        if index.contains_key(digest) {
            // A concurrent put won the race; ours was a duplicate write of
            // identical bytes to the same path.
            return Ok(());
        }
        index.insert(digest.clone(), blob);
        if let Err(e) = self.persist_index(&index).await {
            index.remove(digest);
            return Err(Error::BlobMetadata(e.to_string()));
        }
        Ok(())
    }

    /// Fetch blob bytes: local cache first, then durable store with a
    /// local backfill.
    pub async fn get(&self, digest: &Digest) -> Result<Vec<u8>> {
        let path = digest.storage_path();
        if self.cache.exists(&path).await? {
            return self.cache.read(&path).await;
        }
        if self.durable.exists(&path).await? {
            let data = self.durable.download(&path).await?;
            if let Err(e) = self.cache.write(&path, &data).await {
                warn!(digest = %digest, error = %e, "blob_store: backfill write failed");
            }
            return Ok(data);
        }
        Err(Error::BlobNotFound(digest.clone()))
    }

    /// Delete the blob unconditionally.
    ///
    /// Callers must have already verified reference safety; the store does
    /// not re-check. The index entry goes first: a durable delete that then
    /// fails leaves an orphaned object, which the next `put` for the same
    /// digest reuses instead of re-uploading.
    pub async fn delete(&self, digest: &Digest) -> Result<()> {
        {
            let mut index = self.index.write().await;
            if let Some(removed) = index.remove(digest) {
                if let Err(e) = self.persist_index(&index).await {
                    index.insert(digest.clone(), removed);
                    return Err(Error::BlobMetadata(e.to_string()));
                }
            }
        }
        let path = digest.storage_path();
        self.cache.delete(&path).await?;
        self.durable.delete(&path).await?;
        Ok(())
    }

    /// Metadata record for a digest, if recorded.
    pub async fn meta(&self, digest: &Digest) -> Option<FileBlob> {
        self.index.read().await.get(digest).cloned()
    }

    /// Aggregate size of all recorded blobs, in bytes.
    ///
    /// This is the quota accounting input: each digest counts once no
    /// matter how many documents reference it.
    pub async fn usage(&self) -> u64 {
        self.index
            .read()
            .await
            .values()
            .map(|b| b.size_bytes)
            .sum()
    }

    async fn persist_index(&self, index: &HashMap<Digest, FileBlob>) -> Result<()> {
        let mut blobs: Vec<FileBlob> = index.values().cloned().collect();
        blobs.sort_by(|a, b| a.digest.cmp(&b.digest));
        let raw = serde_json::to_vec_pretty(&BlobIndexFile { blobs })?;

        let temp_path = self.index_path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&raw).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &self.index_path).await?;
        Ok(())
    }
}
