//! Content digests: the single source of identity for stored bytes.
//!
//! Every blob, knowledge entry, and document-to-blob reference is keyed by
//! the BLAKE3 hash of the file bytes, rendered as `blake3:{64-char-hex}`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Scheme prefix on the canonical digest string.
pub const DIGEST_PREFIX: &str = "blake3:";

/// Hex length of a 256-bit BLAKE3 hash.
const DIGEST_HEX_LEN: usize = 64;

/// A content digest in canonical `blake3:{hex}` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Compute the digest of a byte buffer.
    ///
    /// Deterministic: identical bytes always produce the identical digest.
    pub fn compute(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self(format!("{}{}", DIGEST_PREFIX, hash.to_hex()))
    }

    /// Parse a digest from its canonical string form.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix(DIGEST_PREFIX)
            .ok_or_else(|| Error::InvalidInput(format!("digest missing '{}' prefix", DIGEST_PREFIX)))?;
        if hex.len() != DIGEST_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(Error::InvalidInput(format!("malformed digest: {}", s)));
        }
        Ok(Self(s.to_string()))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare hex portion without the scheme prefix.
    pub fn hex(&self) -> &str {
        &self.0[DIGEST_PREFIX.len()..]
    }

    /// Relative storage path for this digest's blob.
    ///
    /// Path format: `blobs/{first-2-hex}/{next-2-hex}/{hex}.bin`. The same
    /// relative path is used by the local cache and the durable store, so a
    /// digest alone is enough to address the bytes anywhere.
    pub fn storage_path(&self) -> String {
        let hex = self.hex();
        format!("blobs/{}/{}/{}.bin", &hex[0..2], &hex[2..4], hex)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
