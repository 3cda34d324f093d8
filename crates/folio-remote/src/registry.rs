//! Reference-count queries against the hosted registry mirror.
//!
//! Every failure maps to `Error::ReferenceCheck` so the safety checker can
//! fail closed without inspecting the cause.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use folio_core::{Digest, Error, RemoteRegistry, Result};

use crate::config::RemoteConfig;

/// HTTP implementation of [`RemoteRegistry`] against the hosted backend.
pub struct HttpRemoteRegistry {
    client: Client,
    config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct ReferenceCountResponse {
    active_references: u64,
}

impl HttpRemoteRegistry {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: config.client(),
            config,
        }
    }
}

#[async_trait]
impl RemoteRegistry for HttpRemoteRegistry {
    async fn active_reference_count(&self, digest: &Digest) -> Result<u64> {
        let url = self
            .config
            .endpoint(&format!("v1/references/{}", digest.as_str()));
        let resp = self
            .config
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::ReferenceCheck(e.to_string()))?;

        // A digest the mirror has never seen is simply unreferenced.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        if !resp.status().is_success() {
            return Err(Error::ReferenceCheck(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }

        let body: ReferenceCountResponse = resp
            .json()
            .await
            .map_err(|e| Error::ReferenceCheck(e.to_string()))?;
        Ok(body.active_references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_count_response_parses() {
        let body: ReferenceCountResponse =
            serde_json::from_str(r#"{"active_references": 3, "digest": "blake3:aa"}"#).unwrap();
        assert_eq!(body.active_references, 3);
    }
}
