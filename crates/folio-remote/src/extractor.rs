//! Metadata-extraction service client.
//!
//! The service is an AI backend and is treated as best-effort: callers
//! never fail an upload over an `Extraction` error, and rate limiting is
//! surfaced the same way as any other failure.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use folio_core::{Error, Knowledge, KnowledgeExtractor, Result};

use crate::config::RemoteConfig;

/// HTTP implementation of [`KnowledgeExtractor`] against the hosted
/// extraction service.
pub struct HttpExtractor {
    client: Client,
    config: RemoteConfig,
}

impl HttpExtractor {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: config.client(),
            config,
        }
    }
}

#[async_trait]
impl KnowledgeExtractor for HttpExtractor {
    async fn extract(&self, data: &[u8], media_type: &str) -> Result<Knowledge> {
        let url = self.config.endpoint("v1/extract");
        debug!(size_bytes = data.len(), media_type = %media_type, "extractor: extract");

        let req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, media_type.to_string())
            .body(data.to_vec());
        let resp = self
            .config
            .authorize(req)
            .send()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Extraction(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }

        let knowledge: Knowledge = resp
            .json()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;
        Ok(knowledge.normalized())
    }
}
