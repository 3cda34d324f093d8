//! Durable object storage client.
//!
//! Objects are addressed by the digest-derived relative path; the store is
//! write-once by construction (uploading identical bytes to an existing
//! path is harmless).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use folio_core::{DurableStore, Error, Result};

use crate::config::RemoteConfig;

/// HTTP implementation of [`DurableStore`] against the hosted backend.
pub struct HttpDurableStore {
    client: Client,
    config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    locator: Option<String>,
}

impl HttpDurableStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: config.client(),
            config,
        }
    }

    fn object_url(&self, path: &str) -> String {
        self.config.endpoint(&format!("v1/objects/{}", path))
    }
}

#[async_trait]
impl DurableStore for HttpDurableStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        let url = self.object_url(path);
        debug!(path = %path, size_bytes = data.len(), "durable: upload");

        let req = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec());
        let resp = self
            .config
            .authorize(req)
            .send()
            .await
            .map_err(|e| Error::DurableUpload(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::DurableUpload(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }

        // Providers may report their own locator; the object path is the
        // locator otherwise.
        let locator = resp
            .json::<UploadResponse>()
            .await
            .ok()
            .and_then(|r| r.locator)
            .unwrap_or_else(|| path.to_string());
        Ok(locator)
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.object_url(path);
        let resp = self.config.authorize(self.client.get(&url)).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        let resp = resp.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.object_url(path);
        let resp = self
            .config
            .authorize(self.client.delete(&url))
            .send()
            .await?;

        // Deleting a missing object is not an error.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        resp.error_for_status()?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let url = self.object_url(path);
        let resp = self.config.authorize(self.client.head(&url)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(Error::Request(format!("{} returned {}", url, s))),
        }
    }
}
